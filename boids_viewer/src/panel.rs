use boids_engine::{
    birdwatcher::BoidReport,
    color::HexColor,
    options::{OverlayFlags, SettingsUpdate, SimulationSettings},
};
use nannou_egui::{egui, Egui};

pub struct ControlsState {
    pub controls_open: bool,
    pub fps_limit_on: bool,
    pub fps: u32,
}

/// Read-only numbers shown at the bottom of the controls.
pub struct Status {
    pub ticks: u64,
    pub fps: f32,
    pub paused: bool,
}

/// What the user asked for this frame.
#[derive(Default)]
pub struct PanelOutput {
    pub updates: Vec<SettingsUpdate>,
    pub overlays: OverlayFlags,
    pub reset: bool,
    pub toggle_pause: bool,
    pub ticker_changed: bool,
    pub close_selection: bool,
}

// records the patch when the widget changed, reports whether it is being dragged
fn track(response: &egui::Response, updates: &mut Vec<SettingsUpdate>, update: SettingsUpdate) -> bool {
    if response.changed() {
        updates.push(update);
    }
    response.dragged()
}

fn color_row(ui: &mut egui::Ui, label: &str, color: HexColor) -> Option<String> {
    let mut rgb = [color.r, color.g, color.b];
    let mut picked = None;

    ui.horizontal(|ui| {
        ui.label(label);
        if ui.color_edit_button_srgb(&mut rgb).changed() {
            picked = Some(HexColor::new(rgb[0], rgb[1], rgb[2]).to_string());
        }
    });

    picked
}

/// Draws the controls and the selected boid's info window.
pub fn update_ui(
    egui: &mut Egui,
    settings: &SimulationSettings,
    state: &mut ControlsState,
    status: &Status,
    report: Option<&BoidReport>,
) -> PanelOutput {
    let mut out = PanelOutput::default();
    let mut edit = settings.clone();
    let ctx = egui.begin_frame();

    egui::Window::new("controls")
        .default_size(egui::vec2(0.0, 200.0))
        .open(&mut state.controls_open)
        .show(&ctx, |ui| {
            let updates = &mut out.updates;

            ui.collapsing("Population", |ui| {
                let r = ui.add(
                    egui::Slider::new(&mut edit.num_boids, SimulationSettings::num_boids_range())
                        .text("boids"),
                );
                track(&r, updates, SettingsUpdate::NumBoids(edit.num_boids));

                let r = ui.add(
                    egui::Slider::new(&mut edit.scale, SimulationSettings::scale_range())
                        .text("scale"),
                );
                track(&r, updates, SettingsUpdate::Scale(edit.scale));
            });

            ui.collapsing("Appearance", |ui| {
                if let Some(hex) = color_row(ui, "boid colour", edit.boid_color) {
                    updates.push(SettingsUpdate::BoidColor(hex));
                }
                if let Some(hex) = color_row(ui, "trail colour", edit.trail_color) {
                    updates.push(SettingsUpdate::TrailColor(hex));
                }
                if ui.checkbox(&mut edit.draw_trail, "draw trail").changed() {
                    updates.push(SettingsUpdate::DrawTrail(edit.draw_trail));
                }
            });

            ui.collapsing("Movement", |ui| {
                if ui.checkbox(&mut edit.constant_speed, "constant speed").changed() {
                    updates.push(SettingsUpdate::ConstantSpeed(edit.constant_speed));
                }

                if edit.constant_speed {
                    let r = ui.add(
                        egui::Slider::new(&mut edit.constant_speed_value, SimulationSettings::speed_range())
                            .text("speed"),
                    );
                    track(&r, updates, SettingsUpdate::ConstantSpeedValue(edit.constant_speed_value));
                } else {
                    let r = ui.add(
                        egui::Slider::new(&mut edit.min_speed_limit, SimulationSettings::speed_range())
                            .text("min speed"),
                    );
                    track(&r, updates, SettingsUpdate::MinSpeedLimit(edit.min_speed_limit));

                    let r = ui.add(
                        egui::Slider::new(&mut edit.speed_limit, SimulationSettings::speed_range())
                            .text("max speed"),
                    );
                    track(&r, updates, SettingsUpdate::SpeedLimit(edit.speed_limit));
                }

                if ui.checkbox(&mut edit.wraparound_mode, "wraparound").changed() {
                    updates.push(SettingsUpdate::WraparoundMode(edit.wraparound_mode));
                }
            });

            ui.collapsing("Flocking", |ui| {
                let r = ui.add(
                    egui::Slider::new(&mut edit.visual_range, SimulationSettings::visual_range_range())
                        .text("visual range"),
                );
                out.overlays.visual_range =
                    track(&r, updates, SettingsUpdate::VisualRange(edit.visual_range));

                let r = ui.add(
                    egui::Slider::new(&mut edit.centering_factor, SimulationSettings::centering_factor_range())
                        .logarithmic(true)
                        .text("cohesion"),
                );
                track(&r, updates, SettingsUpdate::CenteringFactor(edit.centering_factor));

                let r = ui.add(
                    egui::Slider::new(&mut edit.min_distance, SimulationSettings::min_distance_range())
                        .text("min distance"),
                );
                out.overlays.min_distance =
                    track(&r, updates, SettingsUpdate::MinDistance(edit.min_distance));

                let r = ui.add(
                    egui::Slider::new(&mut edit.avoid_factor, SimulationSettings::steering_factor_range())
                        .logarithmic(true)
                        .text("separation"),
                );
                track(&r, updates, SettingsUpdate::AvoidFactor(edit.avoid_factor));

                let r = ui.add(
                    egui::Slider::new(&mut edit.matching_factor, SimulationSettings::steering_factor_range())
                        .logarithmic(true)
                        .text("alignment"),
                );
                track(&r, updates, SettingsUpdate::MatchingFactor(edit.matching_factor));
            });

            ui.collapsing("Boundary", |ui| {
                let bounded = !edit.wraparound_mode;

                let r = ui.add_enabled(
                    bounded,
                    egui::Slider::new(&mut edit.margin_fraction, SimulationSettings::margin_fraction_range())
                        .text("margin"),
                );
                out.overlays.margins =
                    track(&r, updates, SettingsUpdate::MarginFraction(edit.margin_fraction));

                let r = ui.add_enabled(
                    bounded,
                    egui::Slider::new(&mut edit.turn_factor, SimulationSettings::turn_factor_range())
                        .text("turn factor"),
                );
                track(&r, updates, SettingsUpdate::TurnFactor(edit.turn_factor));
            });

            ui.separator();

            ui.horizontal(|ui| {
                if ui.button(if status.paused { "resume" } else { "pause" }).clicked() {
                    out.toggle_pause = true;
                }
                if ui.button("reset").clicked() {
                    out.reset = true;
                }
            });

            ui.horizontal(|ui| {
                let on = ui.add(egui::Checkbox::new(&mut state.fps_limit_on, "FPS limit"));
                let rate = ui.add_enabled(state.fps_limit_on, egui::Slider::new(&mut state.fps, 5..=120));
                out.ticker_changed = on.changed() || rate.changed();
            });

            ui.label(format!("No. ticks: {t:3.}", t = status.ticks));
            ui.label(format!("FPS: {f:.1}", f = status.fps));
        });

    if let Some(report) = report {
        let mut open = true;
        egui::Window::new(format!("Boid #{}", report.id))
            .open(&mut open)
            .resizable(false)
            .show(&ctx, |ui| {
                for line in report.to_string().lines().skip(1) {
                    ui.label(line);
                }
            });
        out.close_selection = !open;
    }

    out
}
