//! Platform layer: windowing, event loop and the editor UI.
//!
//! This is the interactive editor view. It owns the editor state, the orbit
//! camera and the CPU copy of the loaded mesh, and mediates between winit
//! events, the egui controls panel and the renderer:
//! - file picker / label field / submit button mutate [`EditorState`];
//! - non-UI clicks hit-test the mesh and place hotspots at the picked point;
//! - hotspot labels are projected to screen space and painted as overlays
//!   every frame, so they track the camera.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use corelib::camera::Camera;
use corelib::editor::EditorState;
use corelib::ray;
use corelib::{Vec2, Vec3};
use renderer::{GpuState, UiFrame};

/// Cursor travel (physical px) below which a press/release pair counts as a
/// click rather than an orbit drag.
const CLICK_SLOP_PX: f32 = 4.0;

/// Radians of orbit per pixel of drag.
const ORBIT_SENSITIVITY: f32 = 0.01;

/// Startup options resolved by the CLI layer.
#[derive(Debug)]
pub struct RunOptions {
    pub backends: wgpu::Backends,
    pub width: u32,
    pub height: u32,
    /// Model to open immediately, as if picked from the file dialog.
    pub initial_model: Option<PathBuf>,
}

/// Create the window and run the editor until it is closed.
pub fn run(opts: RunOptions) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = EditorApp::new(opts);
    event_loop.run_app(&mut app).context("event loop error")?;
    Ok(())
}

struct EditorApp {
    opts: RunOptions,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_ctx: egui::Context,
    egui_state: Option<egui_winit::State>,

    editor: EditorState,
    camera: Camera,
    // CPU copy of the loaded mesh, kept for hit-testing.
    positions: Vec<[f32; 3]>,
    indices: Vec<u32>,

    // Input tracking
    cursor: Vec2,
    left_down: bool,
    pan_down: bool,
    drag_travel: f32,
    // Deferred so the blocking file dialog runs outside the egui pass.
    pending_open: bool,
}

impl EditorApp {
    fn new(opts: RunOptions) -> Self {
        Self {
            opts,
            window: None,
            gpu: None,
            egui_ctx: egui::Context::default(),
            egui_state: None,
            editor: EditorState::new(),
            camera: Camera::default(),
            positions: Vec::new(),
            indices: Vec::new(),
            cursor: Vec2::ZERO,
            left_down: false,
            pan_down: false,
            drag_travel: 0.0,
            pending_open: false,
        }
    }

    fn viewport(&self) -> Vec2 {
        match &self.gpu {
            Some(gpu) => {
                let (w, h) = gpu.size();
                Vec2::new(w as f32, h as f32)
            }
            None => Vec2::ZERO,
        }
    }

    /// Parse the picked file and, on success, swap in the new model.
    /// On failure everything (previous model, hotspots) is left as-is.
    fn load_model(&mut self, path: &Path) {
        match asset::load_obj_from_path(path) {
            Ok(mesh) => {
                self.editor.load_model(path);
                if let Some(bounds) = mesh.bounds() {
                    self.camera
                        .frame(Vec3::from_array(bounds.center()), bounds.radius());
                }
                self.positions = mesh.vertices.iter().map(|v| v.position).collect();
                self.indices = mesh.indices.clone();
                if let Some(gpu) = &mut self.gpu {
                    gpu.set_mesh(&mesh);
                }
            }
            Err(err) => {
                log::error!("Failed to load model {}: {err}", path.display());
            }
        }
    }

    fn open_model_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("OBJ model", &["obj"])
            .pick_file();
        if let Some(path) = picked {
            self.load_model(&path);
        }
    }

    /// A non-UI click: hit-test the mesh and try to place a hotspot.
    fn handle_click(&mut self) {
        if self.indices.is_empty() {
            // No model loaded: nothing to hit-test, placement unreachable.
            return;
        }
        let viewport = self.viewport();
        let Some(cursor_ray) = ray::screen_ray(&self.camera, self.cursor, viewport) else {
            return;
        };
        match ray::pick_mesh(&cursor_ray, &self.positions, &self.indices) {
            Some(point) => match self.editor.add_hotspot_at(point) {
                Ok(()) => log::debug!("Placed hotspot at {point}"),
                Err(err) => log::debug!("Hotspot placement rejected: {err}"),
            },
            None => log::debug!("Click missed the model"),
        }
    }

    /// Controls panel (left) + hotspot label overlay.
    fn build_ui(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("controls")
            .resizable(false)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                ui.heading("Hotspot3D");
                ui.separator();

                if ui.button("Open model…").clicked() {
                    self.pending_open = true;
                }
                match self.editor.model() {
                    Some(model) => ui.label(model.display_name()),
                    None => ui.weak("No model loaded"),
                };
                ui.separator();

                ui.label("Hotspot label");
                ui.text_edit_singleline(&mut self.editor.pending_label);
                if ui.button("Submit label").clicked() {
                    // Places at the origin; rejections are silent by design.
                    if let Err(err) = self.editor.submit_label() {
                        log::debug!("Submit rejected: {err}");
                    }
                }
                ui.weak("Or click the model to place the label there.");
                ui.separator();

                ui.label(format!("Hotspots ({})", self.editor.hotspots().len()));
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for (i, h) in self.editor.hotspots().iter().enumerate() {
                        ui.label(format!(
                            "{}. {}  ({:.2}, {:.2}, {:.2})",
                            i + 1,
                            h.label,
                            h.position.x,
                            h.position.y,
                            h.position.z
                        ));
                    }
                });
            });

        self.draw_hotspot_overlay(ctx);
    }

    /// Project every hotspot through the camera and paint marker + label at
    /// the resulting screen position.
    fn draw_hotspot_overlay(&self, ctx: &egui::Context) {
        let viewport = self.viewport();
        if viewport == Vec2::ZERO {
            return;
        }
        let ppp = ctx.pixels_per_point();
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("hotspot-overlay"),
        ));

        for hotspot in self.editor.hotspots() {
            let Some(px) = ray::project(&self.camera, hotspot.position, viewport) else {
                continue; // behind the camera
            };
            let pos = egui::pos2(px.x / ppp, px.y / ppp);
            if !ctx.screen_rect().expand(40.0).contains(pos) {
                continue;
            }

            painter.circle_filled(pos, 4.0, egui::Color32::from_rgb(235, 110, 60));
            let galley = painter.layout_no_wrap(
                hotspot.label.clone(),
                egui::FontId::proportional(14.0),
                egui::Color32::WHITE,
            );
            let text_pos = pos + egui::vec2(-galley.size().x * 0.5, -galley.size().y - 10.0);
            painter.rect_filled(
                egui::Rect::from_min_size(text_pos, galley.size()).expand(3.0),
                4.0,
                egui::Color32::from_black_alpha(160),
            );
            painter.galley(text_pos, galley, egui::Color32::WHITE);
        }
    }

    fn redraw(&mut self, window: &Window, event_loop: &ActiveEventLoop) {
        let Some(state) = self.egui_state.as_mut() else {
            return;
        };
        let raw_input = state.take_egui_input(window);
        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| self.build_ui(ctx));
        if let Some(state) = self.egui_state.as_mut() {
            state.handle_platform_output(window, full_output.platform_output);
        }

        // The native dialog blocks; run it between frames, not mid-pass.
        if self.pending_open {
            self.pending_open = false;
            self.open_model_dialog();
        }

        let paint_jobs = ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let (w, h) = gpu.size();
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [w, h],
            pixels_per_point: full_output.pixels_per_point,
        };
        let frame = UiFrame {
            textures_delta: &full_output.textures_delta,
            paint_jobs: &paint_jobs,
            screen: &screen,
        };

        match gpu.render(&self.camera, frame) {
            Ok(()) => {}
            Err(err) if GpuState::is_surface_lost(&err) => {
                log::warn!("Surface lost/outdated; reconfiguring");
                gpu.recreate_surface();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory; exiting");
                event_loop.exit();
            }
            Err(err) => log::warn!("Frame error: {err:?}"),
        }
    }
}

impl ApplicationHandler for EditorApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Hotspot3D")
            .with_inner_size(PhysicalSize::new(self.opts.width, self.opts.height));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(err) => {
                log::error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };
        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let gpu = match pollster::block_on(GpuState::new(window.clone(), self.opts.backends)) {
            Ok(gpu) => gpu,
            Err(err) => {
                log::error!("GPU init failed: {err:#}");
                event_loop.exit();
                return;
            }
        };

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            Some(window.scale_factor() as f32),
            window.theme(),
            None,
        );

        let size = window.inner_size();
        self.camera.aspect = size.width.max(1) as f32 / size.height.max(1) as f32;

        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.window = Some(window.clone());

        if let Some(path) = self.opts.initial_model.take() {
            self.load_model(&path);
        }
        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if id != window.id() {
            return;
        }

        // egui sees every event first; pointer events it consumes stay out of
        // the scene.
        let mut consumed = false;
        if let Some(state) = self.egui_state.as_mut() {
            let resp = state.on_window_event(&window, &event);
            consumed = resp.consumed;
            if resp.repaint {
                window.request_redraw();
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                log::info!("Resized: {}x{}", new_size.width, new_size.height);
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
                self.camera.aspect =
                    new_size.width.max(1) as f32 / new_size.height.max(1) as f32;
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = Vec2::new(position.x as f32, position.y as f32);
                let delta = pos - self.cursor;
                self.cursor = pos;
                if consumed {
                    return;
                }
                if self.left_down {
                    self.drag_travel += delta.length();
                    if self.drag_travel > CLICK_SLOP_PX {
                        self.camera
                            .orbit(delta.x * ORBIT_SENSITIVITY, delta.y * ORBIT_SENSITIVITY);
                    }
                }
                if self.pan_down {
                    let viewport = self.viewport();
                    if viewport.y > 0.0 {
                        self.camera.pan(delta.x / viewport.y, delta.y / viewport.y);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state.is_pressed();
                match button {
                    MouseButton::Left => {
                        if pressed {
                            if !consumed {
                                self.left_down = true;
                                self.drag_travel = 0.0;
                            }
                        } else {
                            let was_down = self.left_down;
                            self.left_down = false;
                            if was_down && self.drag_travel <= CLICK_SLOP_PX && !consumed {
                                self.handle_click();
                            }
                        }
                    }
                    MouseButton::Right | MouseButton::Middle => {
                        self.pan_down = pressed && !consumed;
                    }
                    _ => {}
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if consumed {
                    return;
                }
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                self.camera.zoom(scroll * 0.1);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(&window, event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
