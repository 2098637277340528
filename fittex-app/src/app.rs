use crate::audio;
use anyhow::Result;
use fittex_core::RunnerState;
use fittex_experiment::recorder::default_output_path;
use fittex_experiment::{Effect, Session, SessionConfig, SessionEvent};
use fittex_render::{Scene, SceneRenderer};
use fittex_timing::WallClockTimer;
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use std::path::PathBuf;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    session: Session<WallClockTimer, ThreadRng>,
    renderer: Option<SceneRenderer>,
    output_path: PathBuf,
    /// Last pointer position, already mapped to the origin-centered space
    cursor: (f64, f64),
    current_size: Option<PhysicalSize<u32>>,
    scale_factor: f64,
    should_exit: bool,
}

impl App {
    pub fn new() -> Self {
        let config = SessionConfig::default();
        let output_path = default_output_path(&config.output_file_name);
        let session = Session::new(config, WallClockTimer::new(), rand::rng());

        Self {
            window: None,
            pixels: None,
            session,
            renderer: None,
            output_path,
            cursor: (0.0, 0.0),
            current_size: None,
            scale_factor: 1.0,
            should_exit: false,
        }
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        println!("=== FITTS LAW POINTING EXPERIMENT ===");
        println!("Platform: {}", std::env::consts::OS);
        println!("Output file: {}", self.output_path.display());
        println!("Click to consent and begin. ESC exits.\n");

        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow::anyhow!("No monitor available"))?;

        let window_attributes = Window::default_attributes()
            .with_title("Fitts Law Test")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor))))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        self.current_size = Some(physical_size);
        self.scale_factor = window.scale_factor();

        println!(
            "Display: {}×{} at scale {:.2}",
            physical_size.width, physical_size.height, self.scale_factor
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);
        self.renderer = Some(SceneRenderer::new(
            physical_size.width,
            physical_size.height,
        )?);

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    /// Maps window pixels (origin top-left, y down) to the experiment's
    /// origin-centered space (y up).
    fn to_core(&self, position: PhysicalPosition<f64>) -> (f64, f64) {
        let Some(size) = self.current_size else {
            return (0.0, 0.0);
        };
        (
            position.x - size.width as f64 / 2.0,
            size.height as f64 / 2.0 - position.y,
        )
    }

    fn dispatch(&mut self, event: SessionEvent, event_loop: &ActiveEventLoop) {
        match self.session.handle_event(event) {
            Ok(effects) => {
                if !effects.is_empty() {
                    self.execute(effects);
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
                if self.session.state() == RunnerState::Done {
                    self.cleanup_and_exit(event_loop);
                }
            }
            Err(e) => {
                // Core errors are invariant violations; the session cannot
                // continue.
                eprintln!("fatal session error: {e}");
                self.should_exit = true;
                event_loop.exit();
            }
        }
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::DrawTarget { geometry, retry } => {
                    if let Some(renderer) = &mut self.renderer {
                        renderer.set_scene(Scene::Trial);
                        renderer.show_target(geometry, retry);
                    }
                }
                Effect::ClearTarget => {
                    if let Some(renderer) = &mut self.renderer {
                        renderer.clear_target();
                    }
                }
                Effect::ShowProgress { remaining } => {
                    if let Some(renderer) = &mut self.renderer {
                        renderer.show_progress(remaining);
                    }
                }
                Effect::Beep {
                    frequency_hz,
                    duration_ms,
                } => audio::beep(frequency_hz, duration_ms),
                Effect::RecenterPointer => self.recenter_pointer(),
                Effect::ShowCompletion => {
                    if let Some(renderer) = &mut self.renderer {
                        renderer.set_scene(Scene::Complete);
                    }
                }
                Effect::ExportLog => self.export_log(),
            }
        }
    }

    /// Warps the pointer back to the screen center so every trial's movement
    /// starts from the origin.
    fn recenter_pointer(&mut self) {
        let (Some(window), Some(size)) = (&self.window, self.current_size) else {
            return;
        };
        let center = PhysicalPosition::new(size.width as i32 / 2, size.height as i32 / 2);
        match window.set_cursor_position(center) {
            Ok(()) => self.cursor = (0.0, 0.0),
            // Not supported on some backends; path lengths then start from
            // the previous click position instead of the center.
            Err(e) => eprintln!("could not recenter pointer: {e}"),
        }
    }

    fn export_log(&mut self) {
        match self.session.recorder().write_csv(&self.output_path) {
            Ok(()) => println!(
                "Exported {} trials to {}",
                self.session.recorder().len(),
                self.output_path.display()
            ),
            // Surfaced, not retried; the in-memory log is lost with the
            // process.
            Err(e) => eprintln!(
                "failed to write session log to {}: {e}",
                self.output_path.display()
            ),
        }
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (&mut self.pixels, &mut self.renderer) else {
            return Ok(());
        };
        renderer.render_frame(pixels.frame_mut())?;
        pixels.render()?;
        Ok(())
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        self.current_size = Some(new_size);
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                eprintln!("Failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                eprintln!("Failed to resize buffer: {e}");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                eprintln!("Failed to resize renderer: {e}");
            }
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_finished() {
            println!("\nSession complete. Thank you!");
        } else {
            println!("\nSession aborted before completion; no log was exported.");
        }
        self.should_exit = true;
        event_loop.exit();
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                eprintln!("Failed to create window and surface: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    eprintln!("render error: {e}");
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = self.to_core(position);
                let (x, y) = self.cursor;
                self.dispatch(SessionEvent::Motion { x, y }, event_loop);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let (x, y) = self.cursor;
                self.dispatch(SessionEvent::Click { x, y }, event_loop);
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                if let PhysicalKey::Code(KeyCode::Escape) = event.physical_key {
                    self.cleanup_and_exit(event_loop);
                }
            }
            WindowEvent::Resized(new_size) => self.handle_resize(new_size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.handle_resize(size);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}
