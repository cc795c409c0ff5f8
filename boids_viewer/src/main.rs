extern crate nannou;
use std::time::{SystemTime, UNIX_EPOCH};

use boids_engine::options::Viewport;
use boids_engine::simulation::Simulation;
use boids_engine::ticker::{EveryFrame, FixedRate};
use clap_serde_derive::{clap::Parser, ClapSerde};
use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod cliargs;
mod panel;
mod surface;

use cliargs::{load_config, Args, Config};
use panel::{update_ui, ControlsState, Status};
use surface::{canvas_point, NannouSurface};

fn main() {
    // RUST_LOG picks the level, e.g. RUST_LOG=boids_engine=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    nannou::app(model).update(update).run();
}

struct Model {
    egui: Egui,
    simulation: Simulation,
    control_state: ControlsState,
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

fn model(app: &App) -> Model {
    let mut args = Args::parse();

    let config = match load_config(&mut args) {
        Ok(config) => config,
        Err(err) => {
            warn!(%err, "falling back to defaults and flags");
            Config::from(&mut args.config)
        }
    };

    let main_window = app
        .new_window()
        .key_pressed(key_pressed)
        .mouse_pressed(mouse_pressed)
        .resized(resized)
        .closed(window_closed)
        .size(config.init_width, config.init_height)
        .title("boids flocking")
        .raw_event(raw_window_event)
        .view(view)
        .build();

    let main_window = match main_window {
        Ok(id) => id,
        Err(err) => {
            error!(?err, "could not open a window");
            std::process::exit(1);
        }
    };

    let window = match app.window(main_window) {
        Some(window) => window,
        None => {
            error!("window closed before start-up");
            std::process::exit(1);
        }
    };

    let rect = window.rect();
    let seed = if config.seed == 0 { seed_from_clock() } else { config.seed };
    let mut simulation = Simulation::new(
        config.simulation_settings(),
        Viewport::new(rect.w(), rect.h()),
        seed,
    );

    let fps_limit_on = config.fps_limit > 0;
    if fps_limit_on {
        simulation.set_ticker(FixedRate::new(config.fps_limit));
    }

    Model {
        egui: Egui::from_window(&window),
        simulation,
        control_state: ControlsState {
            controls_open: true,
            fps_limit_on,
            fps: if fps_limit_on { config.fps_limit } else { 60 },
        },
    }
}

fn update(app: &App, model: &mut Model, update: Update) {
    let Model {
        ref mut egui,
        ref mut simulation,
        ref mut control_state,
    } = *model;

    // update controls UI
    egui.set_elapsed_time(update.since_start);
    let status = Status {
        ticks: simulation.ticks(),
        fps: app.fps(),
        paused: simulation.is_paused(),
    };
    let settings = simulation.settings();
    let out = update_ui(egui, &settings, control_state, &status, simulation.selected_report());

    for patch in out.updates {
        // a rejected patch is already logged, the old value stays
        let _ = simulation.update_setting(patch);
    }

    let mut overlays = simulation.overlays();
    overlays.visual_range = out.overlays.visual_range;
    overlays.min_distance = out.overlays.min_distance;
    overlays.margins = out.overlays.margins;
    simulation.set_overlays(overlays);

    if out.ticker_changed {
        if control_state.fps_limit_on {
            simulation.set_ticker(FixedRate::new(control_state.fps));
        } else {
            simulation.set_ticker(EveryFrame);
        }
    }
    if out.toggle_pause {
        simulation.toggle_pause();
    }
    if out.reset {
        simulation.reset();
    }
    if out.close_selection {
        simulation.clear_selection();
    }

    simulation.advance(update.since_start);
}

fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}

fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    if key == Key::Space {
        // pause the whole simulation
        model.simulation.toggle_pause();
    } else if key == Key::C {
        // show/hide controls
        model.control_state.controls_open = !model.control_state.controls_open;
    } else if key == Key::R {
        // restart the flock with the current settings
        model.simulation.reset();
    }
}

fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left || model.egui.ctx().is_pointer_over_area() {
        return;
    }

    let point = canvas_point(&model.simulation.viewport(), vec2(app.mouse.x, app.mouse.y));
    match model.simulation.select_at(point) {
        Some(id) => debug!(id, "clicked boid"),
        None => debug!(x = point.x, y = point.y, "clicked empty space"),
    }
}

fn resized(_app: &App, model: &mut Model, size: Vec2) {
    model.simulation.resize(Viewport::new(size.x, size.y));
}

fn window_closed(_app: &App, model: &mut Model) {
    info!(ticks = model.simulation.ticks(), "window closed");
    model.simulation.stop();
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();

    let mut surface = NannouSurface::new(&draw, model.simulation.viewport());
    model.simulation.render(&mut surface);

    if let Err(err) = draw.to_frame(app, &frame) {
        error!(?err, "could not draw the flock");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        error!(?err, "could not draw the controls");
    }
}
