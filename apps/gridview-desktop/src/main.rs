mod panel;

use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec3;
use gridview_common::{ConfigWatcher, DemoConfig, GridParams, PipelineVariant, SampleMeshConfig};
use gridview_render::SampleMesh;
use gridview_render_wgpu::{FlyCamera, WgpuRenderer};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const CONFIG_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "gridview-desktop", about = "Procedural grid viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (YAML or JSON); loaded at start if present, watched for edits
    #[arg(long, default_value = "gridview.yaml")]
    config: PathBuf,

    /// Open the debug panel at start
    #[arg(long)]
    debug: bool,
}

/// Application state.
struct AppState {
    params: GridParams,
    variant: PipelineVariant,
    mesh: SampleMesh,
    camera: FlyCamera,
    show_panel: bool,
    config_path: PathBuf,
    watcher: ConfigWatcher,
    // Input state
    keys_held: HashSet<KeyCode>,
    mouse_captured: bool,
    last_frame: Instant,
    frame_stats: panel::FrameStats,
}

impl AppState {
    fn new(config_path: PathBuf, show_panel: bool) -> Self {
        let config = if config_path.exists() {
            match DemoConfig::load(&config_path) {
                Ok(config) => {
                    tracing::info!("loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("ignoring config {}: {e}", config_path.display());
                    DemoConfig::default()
                }
            }
        } else {
            tracing::info!("no config at {}, using defaults", config_path.display());
            DemoConfig::default()
        };

        Self {
            params: config.grid,
            variant: config.variant,
            mesh: SampleMesh::new(&config.sample_mesh),
            camera: FlyCamera::default(),
            show_panel,
            watcher: ConfigWatcher::new(&config_path, CONFIG_POLL_INTERVAL),
            config_path,
            keys_held: HashSet::new(),
            mouse_captured: false,
            last_frame: Instant::now(),
            frame_stats: panel::FrameStats::default(),
        }
    }

    fn current_config(&self) -> DemoConfig {
        DemoConfig {
            grid: self.params,
            variant: self.variant,
            sample_mesh: SampleMeshConfig {
                fps: self.mesh.fps(),
                spin_speed: self.mesh.spin_speed,
            },
        }
    }

    fn apply_config(&mut self, config: DemoConfig) {
        self.params = config.grid;
        self.variant = config.variant;
        self.mesh.apply_config(&config.sample_mesh);
    }

    fn update(&mut self, dt: f32) {
        self.frame_stats.record(dt);

        let speed_mult = if self.keys_held.contains(&KeyCode::ShiftLeft) {
            3.0
        } else {
            1.0
        };

        let mut local = Vec3::ZERO;
        if self.keys_held.contains(&KeyCode::KeyW) {
            local.z += 1.0;
        }
        if self.keys_held.contains(&KeyCode::KeyS) {
            local.z -= 1.0;
        }
        if self.keys_held.contains(&KeyCode::KeyD) {
            local.x += 1.0;
        }
        if self.keys_held.contains(&KeyCode::KeyA) {
            local.x -= 1.0;
        }
        if self.keys_held.contains(&KeyCode::Space) {
            local.y += 1.0;
        }
        if self.keys_held.contains(&KeyCode::ControlLeft) {
            local.y -= 1.0;
        }
        if local != Vec3::ZERO {
            self.camera.fly(local, dt * speed_mult);
        }

        self.mesh.tick(dt);

        match self.watcher.poll(Instant::now()) {
            Ok(Some(config)) => self.apply_config(config),
            Ok(None) => {}
            Err(e) => tracing::warn!("config reload failed, keeping current values: {e}"),
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys_held.insert(key);
        } else {
            self.keys_held.remove(&key);
        }

        if !pressed {
            return;
        }

        match key {
            KeyCode::F1 => {
                self.show_panel = !self.show_panel;
            }
            KeyCode::F5 => {
                self.save_config();
            }
            KeyCode::F9 => {
                self.reload_config();
            }
            _ => {}
        }
    }

    fn save_config(&mut self) {
        match self.current_config().save(&self.config_path) {
            Ok(()) => self.watcher.mark_seen(),
            Err(e) => {
                tracing::error!("save failed: {e}");
            }
        }
    }

    fn reload_config(&mut self) {
        match DemoConfig::load(&self.config_path) {
            Ok(config) => {
                self.apply_config(config);
                self.watcher.mark_seen();
                tracing::info!("config loaded from {}", self.config_path.display());
            }
            Err(e) => {
                tracing::error!("load failed: {e}");
            }
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let mut fps = self.mesh.fps();
        let actions = panel::draw(
            ctx,
            panel::PanelView {
                params: &mut self.params,
                variant: &mut self.variant,
                mesh_fps: &mut fps,
                camera_position: self.camera.position,
                stats: self.frame_stats,
                config_path: &self.config_path,
            },
        );
        if fps != self.mesh.fps() {
            self.mesh.set_fps(fps);
        }

        if actions.save {
            self.save_config();
        }
        if actions.reload {
            self.reload_config();
        }
        if actions.reset {
            self.params = GridParams::default();
            self.variant = PipelineVariant::default();
            tracing::info!("grid parameters reset to defaults");
        }
    }
}

/// Window plus everything bound to its surface.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Grid View")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("gridview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn render_frame(&mut self, state: &mut AppState, egui_ctx: &EguiContext) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.render(
            &self.device,
            &self.queue,
            &view,
            &state.camera,
            &state.params,
            state.variant,
            &state.mesh,
        );

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct GpuApp {
    state: AppState,
    egui_ctx: EguiContext,
    gpu: Option<Gpu>,
}

impl GpuApp {
    fn new(config_path: PathBuf, show_panel: bool) -> Self {
        Self {
            state: AppState::new(config_path, show_panel),
            egui_ctx: EguiContext::default(),
            gpu: None,
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                self.state.camera.aspect = gpu.aspect();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("GPU initialization failed: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
                self.state.camera.aspect = gpu.aspect();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: btn_state,
                ..
            } => {
                self.state.mouse_captured = btn_state == ElementState::Pressed;
                gpu.window.set_cursor_visible(!self.state.mouse_captured);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
                self.state.last_frame = now;
                self.state.update(dt);

                gpu.render_frame(&mut self.state, &self.egui_ctx);
                gpu.window.request_redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.mouse_captured {
                self.state.camera.rotate(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("gridview-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(cli.config, cli.debug);
    event_loop.run_app(&mut app)?;

    Ok(())
}
