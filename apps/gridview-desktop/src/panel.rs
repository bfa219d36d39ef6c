//! Debug panel: one widget per grid uniform, plus sample-mesh and config
//! controls.

use egui::{Context, Ui};
use glam::Vec3;
use gridview_common::{GridParams, PipelineVariant, Rgb};
use std::ops::RangeInclusive;
use std::path::Path;

pub const LINE_WIDTH_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const GRID_DIV_RANGE: RangeInclusive<f32> = 1.0..=20.0;
pub const MAJOR_GRID_DIV_RANGE: RangeInclusive<f32> = 1.0..=50.0;
pub const ALPHA_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const MESH_FPS_RANGE: RangeInclusive<f32> = 1.0..=120.0;

/// Exponentially smoothed frame time, shown at the top of the panel.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameStats {
    smoothed_dt: Option<f32>,
}

impl FrameStats {
    const SMOOTHING: f32 = 0.1;

    pub fn record(&mut self, dt: f32) {
        self.smoothed_dt = Some(match self.smoothed_dt {
            Some(s) => s + (dt - s) * Self::SMOOTHING,
            None => dt,
        });
    }

    pub fn frame_ms(&self) -> f32 {
        self.smoothed_dt.unwrap_or(0.0) * 1000.0
    }

    pub fn fps(&self) -> f32 {
        match self.smoothed_dt {
            Some(dt) if dt > 0.0 => 1.0 / dt,
            _ => 0.0,
        }
    }
}

/// Requests raised by the panel's buttons this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PanelActions {
    pub save: bool,
    pub reload: bool,
    pub reset: bool,
}

/// Everything the panel reads or edits.
pub struct PanelView<'a> {
    pub params: &'a mut GridParams,
    pub variant: &'a mut PipelineVariant,
    pub mesh_fps: &'a mut f32,
    pub camera_position: Vec3,
    pub stats: FrameStats,
    pub config_path: &'a Path,
}

pub fn draw(ctx: &Context, view: PanelView<'_>) -> PanelActions {
    let mut actions = PanelActions::default();
    let PanelView {
        params,
        variant,
        mesh_fps,
        camera_position,
        stats,
        config_path,
    } = view;

    egui::SidePanel::left("debug_panel")
        .default_width(280.0)
        .show(ctx, |ui| {
            ui.heading("Grid View");
            ui.label(format!(
                "{:.2} ms/frame ({:.0} FPS)",
                stats.frame_ms(),
                stats.fps()
            ));
            ui.label(format!(
                "Camera: ({:.1}, {:.1}, {:.1})",
                camera_position.x, camera_position.y, camera_position.z
            ));
            ui.separator();

            egui::CollapsingHeader::new("Grid")
                .default_open(true)
                .show(ui, |ui| grid_controls(ui, params, variant));

            egui::CollapsingHeader::new("Sample mesh")
                .default_open(true)
                .show(ui, |ui| {
                    ui.add(
                        egui::Slider::new(mesh_fps, MESH_FPS_RANGE)
                            .step_by(1.0)
                            .text("FPS"),
                    );
                });

            ui.separator();
            ui.label(format!("Config: {}", config_path.display()));
            ui.horizontal(|ui| {
                actions.save = ui.button("Save (F5)").clicked();
                actions.reload = ui.button("Reload (F9)").clicked();
                actions.reset = ui.button("Defaults").clicked();
            });

            ui.separator();
            ui.small("F1: Toggle Panel | RMB: Look | WASD: Move");
        });

    actions
}

fn grid_controls(ui: &mut Ui, params: &mut GridParams, variant: &mut PipelineVariant) {
    ui.add(egui::Slider::new(&mut params.major_line_width, LINE_WIDTH_RANGE).text("Major Line Width"));
    ui.add(egui::Slider::new(&mut params.minor_line_width, LINE_WIDTH_RANGE).text("Minor Line Width"));
    ui.add(egui::Slider::new(&mut params.axis_line_width, LINE_WIDTH_RANGE).text("Axis Line Width"));
    ui.add(
        egui::Slider::new(&mut params.grid_div, GRID_DIV_RANGE)
            .step_by(1.0)
            .text("Grid Div"),
    );
    ui.add(
        egui::Slider::new(&mut params.major_grid_div, MAJOR_GRID_DIV_RANGE)
            .step_by(1.0)
            .text("Major Grid Div"),
    );
    ui.add(egui::Slider::new(&mut params.base_alpha, ALPHA_RANGE).text("Base Alpha"));

    color_row(ui, "Base Color", &mut params.base_color);
    color_row(ui, "Major Line Color", &mut params.major_line_color);
    color_row(ui, "Minor Line Color", &mut params.minor_line_color);
    color_row(ui, "X Axis Color", &mut params.x_axis_color);
    color_row(ui, "Z Axis Color", &mut params.z_axis_color);

    ui.horizontal(|ui| {
        ui.label("Pipeline:");
        for v in PipelineVariant::ALL {
            ui.radio_value(variant, v, v.to_string());
        }
    });
}

fn color_row(ui: &mut Ui, label: &str, color: &mut Rgb) {
    ui.horizontal(|ui| {
        // egui's rgb picker edits linear values, matching `Rgb`.
        let mut rgb = color.to_array();
        if ui.color_edit_button_rgb(&mut rgb).changed() {
            *color = rgb.into();
        }
        ui.label(label);
    });
}
