use ab_glyph::{point, Font, FontVec, Glyph, PxScale, ScaleFont};
use tiny_skia::{Color, Pixmap, PremultipliedColorU8};

/// Common system font locations, tried in order at startup. Labels are
/// skipped when none of them exists; the experiment itself does not depend
/// on text rendering.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub fn load_system_font() -> Option<FontVec> {
    for path in FONT_CANDIDATES {
        if let Ok(data) = std::fs::read(path) {
            if let Ok(font) = FontVec::try_from_vec(data) {
                return Some(font);
            }
        }
    }
    None
}

/// Rasterizes a single text line into a transparent premultiplied pixmap
/// sized to the glyph bounds.
pub fn render_text_pixmap(text: &str, font_size: f32, font: &FontVec, color: Color) -> Pixmap {
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);

    // Layout with the baseline at ascent
    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }

    // Union pixel bounds of the outlined glyphs
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for g in &glyphs {
        if let Some(out) = font.outline_glyph(g.clone()) {
            let b = out.px_bounds();
            min_x = min_x.min(b.min.x);
            min_y = min_y.min(b.min.y);
            max_x = max_x.max(b.max.x);
            max_y = max_y.max(b.max.y);
        }
    }

    if min_x == f32::INFINITY {
        return Pixmap::new(1, 1).expect("pixmap");
    }

    let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let mut pm = Pixmap::new(w, h).expect("pixmap");

    let cu = [
        (color.red() * 255.0) as u8,
        (color.green() * 255.0) as u8,
        (color.blue() * 255.0) as u8,
        (color.alpha() * 255.0) as u8,
    ];

    let stride = pm.width() as usize;
    let dst = pm.pixels_mut();
    for g in &glyphs {
        if let Some(out) = font.outline_glyph(g.clone()) {
            let b = out.px_bounds();
            out.draw(|x, y, cov| {
                if cov <= f32::EPSILON {
                    return;
                }
                let ix = (x as f32 + b.min.x - min_x).floor() as i32;
                let iy = (y as f32 + b.min.y - min_y).floor() as i32;
                if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                    return;
                }
                let i = iy as usize * stride + ix as usize;

                // Premultiply by coverage * alpha; glyphs overlap at most on
                // kerned edges, keep the stronger coverage.
                let a_lin = (cov * cu[3] as f32 / 255.0).clamp(0.0, 1.0);
                let sa = (a_lin * 255.0) as u8;
                if dst[i].alpha() >= sa {
                    return;
                }
                let sr = (cu[0] as f32 * a_lin) as u8;
                let sg = (cu[1] as f32 * a_lin) as u8;
                let sb = (cu[2] as f32 * a_lin) as u8;
                if let Some(px) = PremultipliedColorU8::from_rgba(sr, sg, sb, sa) {
                    dst[i] = px;
                }
            });
        }
    }

    pm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_pixmap_has_ink_when_a_font_is_available() {
        let Some(font) = load_system_font() else {
            return;
        };
        let pm = render_text_pixmap(
            "Tests Left: 120",
            18.0,
            &font,
            Color::from_rgba8(255, 255, 255, 255),
        );
        assert!(pm.width() > 1);
        assert!(pm.pixels().iter().any(|p| p.alpha() > 0));
    }

    #[test]
    fn empty_text_yields_a_unit_pixmap() {
        let Some(font) = load_system_font() else {
            return;
        };
        let pm = render_text_pixmap("", 18.0, &font, Color::from_rgba8(255, 255, 255, 255));
        assert_eq!((pm.width(), pm.height()), (1, 1));
    }
}
