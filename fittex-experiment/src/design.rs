use fittex_core::{Gap, Side, TargetSize, TrialSpec};

/// The 12 base combinations of the size x gap x side design
pub fn base_combinations() -> Vec<TrialSpec> {
    let mut combos = Vec::with_capacity(TargetSize::ALL.len() * Gap::ALL.len() * Side::ALL.len());
    for side in Side::ALL {
        for gap in Gap::ALL {
            for size in TargetSize::ALL {
                combos.push(TrialSpec::new(size, gap, side));
            }
        }
    }
    combos
}

/// Expands the base combinations into `replicates` copies each. Presentation
/// order is left to the sequencer; no shuffling happens here.
pub fn generate(base: &[TrialSpec], replicates: usize) -> Vec<TrialSpec> {
    let mut pool = Vec::with_capacity(base.len() * replicates);
    for spec in base {
        for _ in 0..replicates {
            pool.push(*spec);
        }
    }
    pool
}
