use crate::config::{self, Config, WINDOW_TITLE};
use crate::core::clock::FPSCounter;
use crate::core::input::{self, Control};
use crate::game::events::LogSink;
use crate::game::gameplay::{self, State};
use rand::rngs::StdRng;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use log::{error, info};
use std::{error::Error, sync::Arc};

pub struct App {
    window: Option<Arc<Window>>,
    gameplay_state: State,
    sink: LogSink,
    fps: FPSCounter,
    last_fps: f32,
    last_title: String,
    display_width: u32,
    display_height: u32,
}

impl App {
    fn new(config: &Config, rng: StdRng) -> Self {
        Self {
            window: None,
            gameplay_state: gameplay::init(config, rng),
            sink: LogSink,
            fps: FPSCounter::new(),
            last_fps: 0.0,
            last_title: String::new(),
            display_width: config.display_width,
            display_height: config.display_height,
        }
    }

    fn handle_control(&mut self, control: Control, event_loop: &ActiveEventLoop) {
        match control {
            Control::Start => gameplay::start(&mut self.gameplay_state, &mut self.sink),
            Control::Pause => gameplay::pause(&mut self.gameplay_state, &mut self.sink),
            Control::ToggleDebug => gameplay::toggle_debug(&mut self.gameplay_state, &mut self.sink),
            Control::Quit => {
                info!("Exit requested. Shutting down.");
                event_loop.exit();
            }
        }
    }

    fn title(&self) -> String {
        let gs = &self.gameplay_state;
        let status = if gs.playing { "PLAYING" } else { "PAUSED" };
        let mut title = format!(
            "{} | Score: {} | Combo: {} | {} | {:.1} FPS",
            WINDOW_TITLE, gs.score, gs.combo, status, self.last_fps
        );
        if gs.debug {
            title.push_str(&format!(
                " | notes {} | misses {} | frame {}",
                gs.notes.len(),
                gs.counts.misses,
                gs.clock.frame()
            ));
        }
        title
    }

    // Only touch the window title when its text actually changes.
    fn refresh_title(&mut self, window: &Window) {
        let title = self.title();
        if title != self.last_title {
            window.set_title(&title);
            self.last_title = title;
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let window_attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_resizable(true)
            .with_inner_size(PhysicalSize::new(self.display_width, self.display_height));

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        self.refresh_title(&window);
        self.window = Some(window);
        info!("Window ready. Enter/Space to start, P to pause, F3 for debug, Esc to quit.");
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                error!("Failed to create window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_ref().cloned() else { return; };
        if window_id != window.id() { return; }

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested. Shutting down.");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if let Some(control) = input::control_for(&key_event) {
                    self.handle_control(control, event_loop);
                    self.refresh_title(&window);
                    return;
                }
                gameplay::handle_key_press(&mut self.gameplay_state, &key_event, &mut self.sink);
            }
            WindowEvent::RedrawRequested => {
                gameplay::update(&mut self.gameplay_state, &mut self.sink);
                if let Some(fps) = self.fps.update() {
                    self.last_fps = fps;
                }
                self.refresh_title(&window);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let gs = &self.gameplay_state;
        info!(
            "Final score {} (max combo {}, {} hits, {} holds, {} misses).",
            gs.score,
            gs.max_combo,
            gs.counts.hits,
            gs.counts.holds_started,
            gs.counts.misses
        );
    }
}

pub fn run(rng: StdRng) -> Result<(), Box<dyn Error>> {
    let config = config::get();
    let event_loop = EventLoop::new()?;
    let mut app = App::new(&config, rng);
    event_loop.run_app(&mut app)?;
    Ok(())
}
