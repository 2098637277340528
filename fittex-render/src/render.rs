use crate::text;
use ab_glyph::FontVec;
use anyhow::{Context, Result};
use fittex_core::TrialGeometry;
use tiny_skia::{
    Color, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};

/// What the surface is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Consent,
    Trial,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

fn background() -> Color {
    Color::from_rgba8(0, 0, 0, 255)
}

fn text_color() -> Color {
    Color::from_rgba8(255, 255, 255, 255)
}

/// Fresh targets are blue, re-issued (missed) targets red
fn target_color(retry: bool) -> Color {
    if retry {
        Color::from_rgba8(255, 0, 0, 255)
    } else {
        Color::from_rgba8(0, 0, 255, 255)
    }
}

const CONSENT_BODY: &[&str] = &[
    "You are about to take part in a pointing study.",
    "Circular targets will appear left and right of the screen center;",
    "click each one as quickly and accurately as you can.",
    "A missed click replays the same target until it is hit.",
    "",
    "Participation is voluntary. You may withdraw at any time by",
    "closing this window before the run finishes; partial runs are",
    "not recorded.",
    "",
    "If you agree to participate, click anywhere to begin.",
];

/// Composes the experiment scenes into an offscreen pixmap and copies the
/// result into the window's frame buffer on demand. Core coordinates are
/// origin-centered with y up; this is the only place they meet screen space.
pub struct SceneRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),
    font: Option<FontVec>,
    scene: Scene,
    target: Option<(TrialGeometry, bool)>,
    tests_left: Option<usize>,
    canvas: Pixmap,
}

impl SceneRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let canvas = Pixmap::new(width, height).context("zero-sized drawing surface")?;
        let font = text::load_system_font();
        if font.is_none() {
            eprintln!("warning: no system font found, text labels will be skipped");
        }
        Ok(Self {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            font,
            scene: Scene::Consent,
            target: None,
            tests_left: None,
            canvas,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<()> {
        self.canvas = Pixmap::new(new_width, new_height).context("zero-sized drawing surface")?;
        self.width = new_width;
        self.height = new_height;
        self.center = (new_width as f32 / 2.0, new_height as f32 / 2.0);
        Ok(())
    }

    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn show_target(&mut self, geometry: TrialGeometry, retry: bool) {
        self.target = Some((geometry, retry));
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    pub fn show_progress(&mut self, tests_left: usize) {
        self.tests_left = Some(tests_left);
    }

    /// Maps an origin-centered point (y up) to surface pixels (y down)
    fn to_surface(&self, point: (f64, f64)) -> (f32, f32) {
        (
            self.center.0 + point.0 as f32,
            self.center.1 - point.1 as f32,
        )
    }

    /// Redraws the current scene and copies it into `frame` (RGBA, same
    /// dimensions as the surface).
    pub fn render_frame(&mut self, frame: &mut [u8]) -> Result<()> {
        self.canvas.fill(background());
        match self.scene {
            Scene::Consent => self.draw_consent(),
            Scene::Trial => self.draw_trial(),
            Scene::Complete => self.draw_complete(),
        }
        let data = self.canvas.data();
        anyhow::ensure!(
            frame.len() == data.len(),
            "frame buffer size mismatch: {} vs {}",
            frame.len(),
            data.len()
        );
        frame.copy_from_slice(data);
        Ok(())
    }

    fn draw_trial(&mut self) {
        if let Some((geometry, retry)) = self.target {
            let pos = self.to_surface(geometry.center());
            self.fill_circle(pos, geometry.radius as f32, target_color(retry));
        }
        if let Some(left) = self.tests_left {
            let label = format!("Tests Left: {left}");
            let pos = self.to_surface((0.0, -250.0));
            self.draw_text(&label, pos, 18.0, Align::Center);
        }
    }

    fn draw_consent(&mut self) {
        let title_pos = self.to_surface((0.0, 250.0));
        self.draw_text("Consent", title_pos, 40.0, Align::Center);

        let mut y = 140.0;
        for line in CONSENT_BODY {
            let pos = self.to_surface((0.0, y));
            self.draw_text(line, pos, 16.0, Align::Center);
            y -= 24.0;
        }

        let box_pos = self.to_surface((0.0, -200.0));
        self.stroke_rect_centered(box_pos, 120.0, 30.0);
        self.draw_text("I Agree", box_pos, 16.0, Align::Center);
    }

    fn draw_complete(&mut self) {
        self.draw_text("Thank you", self.center, 40.0, Align::Center);
    }

    fn fill_circle(&mut self, pos: (f32, f32), radius: f32, color: Color) {
        let mut pb = PathBuilder::new();
        pb.push_circle(pos.0, pos.1, radius);
        let Some(path) = pb.finish() else {
            return;
        };
        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.set_color(color);
        self.canvas
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    fn stroke_rect_centered(&mut self, pos: (f32, f32), width: f32, height: f32) {
        let Some(rect) = Rect::from_xywh(pos.0 - width / 2.0, pos.1 - height / 2.0, width, height)
        else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let mut paint = Paint::default();
        paint.set_color(text_color());
        let stroke = Stroke {
            width: 2.0,
            ..Stroke::default()
        };
        self.canvas
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Draws one line of text anchored at `pos`. Silently skipped when no
    /// system font was found.
    fn draw_text(&mut self, line: &str, pos: (f32, f32), size: f32, align: Align) {
        let Some(font) = &self.font else {
            return;
        };
        let pm = text::render_text_pixmap(line, size, font, text_color());
        let x = match align {
            Align::Left => pos.0,
            Align::Center => pos.0 - pm.width() as f32 / 2.0,
        };
        let y = pos.1 - pm.height() as f32 / 2.0;
        self.canvas.draw_pixmap(
            x.round() as i32,
            y.round() as i32,
            pm.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}
