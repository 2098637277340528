use fittex_core::TrialGeometry;

/// Closed-interval circle membership test: a click exactly on the boundary
/// counts as a hit. Click coordinates share the geometry's origin-centered
/// space.
pub fn hit(click: (f64, f64), geometry: &TrialGeometry) -> bool {
    let (cx, cy) = geometry.center();
    (click.0 - cx).hypot(click.1 - cy) <= geometry.radius
}

/// Cumulative Euclidean path length over the recorded pointer samples. Zero
/// when fewer than two samples were captured.
pub fn path_distance(samples: &[(f64, f64)]) -> f64 {
    samples
        .windows(2)
        .map(|pair| (pair[1].0 - pair[0].0).hypot(pair[1].1 - pair[0].1))
        .sum()
}

/// Fitts' index of difficulty, `log2(A / W + 1)`
pub fn index_of_difficulty(amplitude: f64, width: f64) -> f64 {
    (amplitude / width + 1.0).log2()
}
