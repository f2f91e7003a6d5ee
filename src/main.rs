use gridlife::application::DEFAULT_CELL_SIZE;
use gridlife::{CanvasSurface, Engine, InitOptions, SurfaceGeometry};
use log::{debug, error, warn};
use macroquad::prelude::*;

/// Delay before a window resize triggers reinitialization
const RESIZE_DEBOUNCE_SECS: f32 = 0.25;

fn window_conf() -> Conf {
    Conf {
        window_title: "Grid Life".to_owned(),
        window_width: 1000,
        window_height: 800,
        window_resizable: true,
        ..Default::default()
    }
}

/// Geometry of the whole window at the configured cell size
fn viewport_geometry(cell_size: u32) -> SurfaceGeometry {
    SurfaceGeometry {
        width: screen_width() as u32,
        height: screen_height() as u32,
        cell_size,
    }
}

fn init_options_for_viewport(cell_size: u32) -> InitOptions {
    let (columns, rows) = viewport_geometry(cell_size).cell_capacity();
    InitOptions {
        rows: Some(rows),
        columns: Some(columns),
        cell_size: Some(cell_size),
        ..Default::default()
    }
}

fn random_seed() -> String {
    use ::rand::Rng;

    let id: u32 = ::rand::rng().random();
    format!("seed-{id:08x}")
}

fn draw_status(engine: &Engine<CanvasSurface>) {
    let options = engine.options();
    let status = if engine.paused() { "Paused" } else { "Running" };
    let status_color = if engine.paused() {
        Color::from_rgba(255, 165, 0, 255)
    } else {
        Color::from_rgba(0, 255, 0, 255)
    };

    draw_text(status, 10.0, 20.0, 20.0, status_color);
    draw_text(
        &format!("Speed: {:.0} gen/s", options.speed),
        10.0,
        40.0,
        16.0,
        WHITE,
    );
    draw_text(&format!("Seed: {}", options.seed), 10.0, 58.0, 16.0, WHITE);
    draw_text(
        &format!("Generation: {}", engine.generation()),
        10.0,
        76.0,
        16.0,
        Color::from_rgba(0, 255, 150, 255),
    );
    draw_text(
        "Space: Play/Pause  Up/Down: Speed  R: Reseed",
        10.0,
        96.0,
        14.0,
        GRAY,
    );
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let mut engine = Engine::new(CanvasSurface::new());
    engine.register_state_changed_listener(|snap| {
        debug!(
            "state changed: paused={} generation={} speed={} seed={:?}",
            snap.paused, snap.generation, snap.options.speed, snap.options.seed
        );
    });

    if let Err(err) = engine.init(init_options_for_viewport(DEFAULT_CELL_SIZE)) {
        error!("initialization failed: {err}");
        return;
    }
    if let Err(err) = engine.start() {
        error!("could not start playback: {err}");
        return;
    }

    // Resize/debounce bookkeeping lives out here in the caller; the
    // engine only ever sees complete init/start/pause calls.
    let mut previous_size = (screen_width(), screen_height());
    let mut resize_timer: Option<f32> = None;
    let mut was_paused: Option<bool> = None;

    loop {
        if is_key_pressed(KeyCode::Space) {
            let result = if engine.paused() {
                engine.start()
            } else {
                engine.pause()
            };
            if let Err(err) = result {
                warn!("playback toggle failed: {err}");
            }
        }
        if is_key_pressed(KeyCode::Up) {
            let speed = (engine.options().speed + 1.0).clamp(1.0, 60.0);
            if let Err(err) = engine.change_speed(speed) {
                warn!("speed change failed: {err}");
            }
        }
        if is_key_pressed(KeyCode::Down) {
            let speed = (engine.options().speed - 1.0).clamp(1.0, 60.0);
            if let Err(err) = engine.change_speed(speed) {
                warn!("speed change failed: {err}");
            }
        }
        if is_key_pressed(KeyCode::R) {
            if let Err(err) = engine.change_seed(random_seed()) {
                warn!("reseed failed: {err}");
            }
        }

        // Debounced reinitialization on window resize. The pre-resize
        // pause state is captured once and restored after the reinit.
        let size = (screen_width(), screen_height());
        if size != previous_size {
            if was_paused.is_none() {
                was_paused = Some(engine.paused());
            }
            resize_timer = Some(0.0);
            previous_size = size;
        }
        if let Some(timer) = resize_timer.as_mut() {
            *timer += get_frame_time();
            if *timer >= RESIZE_DEBOUNCE_SECS {
                resize_timer = None;
                match engine.init(init_options_for_viewport(DEFAULT_CELL_SIZE)) {
                    Ok(()) => {
                        if was_paused == Some(false) {
                            if let Err(err) = engine.start() {
                                warn!("restart after resize failed: {err}");
                            }
                        }
                    }
                    Err(err) => error!("reinit after resize failed: {err}"),
                }
                was_paused = None;
            }
        }

        engine.pump();
        engine.redraw();
        draw_status(&engine);

        next_frame().await;
    }
}
