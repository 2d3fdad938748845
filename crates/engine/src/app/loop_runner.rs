use std::env;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use crate::{
    build_or_load_map_catalog, resolve_app_paths, ContentPipelineError, ContentRequest,
    StartupError,
};

use super::metrics::MetricsAccumulator;
use super::scene::SceneHost;
use super::{InputAction, InputSnapshot, MetricsHandle, OverlayData, Renderer, Scene, SceneCommand};

pub const SLOW_FRAME_ENV_VAR: &str = "DONJON_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
    pub content_request: ContentRequest,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Donjon".to_string(),
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            max_render_fps: None,
            content_request: ContentRequest::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("failed to build or load map catalog: {0}")]
    ContentPipeline(#[from] ContentPipelineError),
    #[error("scene failed to load: {0}")]
    SceneLoad(String),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, scene: Box<dyn Scene>) -> Result<(), AppError> {
    run_app_with_metrics(config, scene, MetricsHandle::default())
}

pub fn run_app_with_metrics(
    config: LoopConfig,
    scene: Box<dyn Scene>,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let mut host = SceneHost::new(scene);
    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        base_content_dir = %app_paths.base_content_dir.display(),
        cache_dir = %app_paths.cache_dir.display(),
        "startup"
    );
    let map_catalog = build_or_load_map_catalog(&app_paths, &config.content_request)?;
    host.set_map_catalog(map_catalog);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    // pixels borrows the window for the surface lifetime, so the window lives
    // for the rest of the process.
    let window: &'static Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    ));
    let renderer =
        Renderer::new(window, app_paths.root.join("assets")).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let timing = LoopTiming::from_config(&config);
    host.load().map_err(AppError::SceneLoad)?;
    host.apply_pending();
    info!(entity_count = host.world().entity_count(), "scene_loaded");
    timing.log();

    let now = Instant::now();
    let mut driver = LoopDriver {
        window,
        renderer,
        host,
        input: InputCollector::new(config.window_width, config.window_height),
        metrics: MetricsAccumulator::new(timing.metrics_log_interval),
        metrics_handle,
        timing,
        accumulator: Duration::ZERO,
        last_frame_at: now,
        last_present_at: now,
        applied_title: None,
        default_title: config.window_title,
        overlay_visible: false,
    };

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == driver.window.id() => {
                let keep_running = match event {
                    WindowEvent::CloseRequested => {
                        driver.input.force_quit();
                        info!(reason = "window_close", "shutdown_requested");
                        false
                    }
                    WindowEvent::Resized(new_size) => {
                        driver.handle_resize(new_size.width, new_size.height)
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = driver.window.inner_size();
                        driver.handle_resize(size.width, size.height)
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        driver.input.handle_mouse_wheel(delta);
                        true
                    }
                    WindowEvent::KeyboardInput { event, .. } => driver.handle_keyboard(&event),
                    WindowEvent::RedrawRequested => driver.run_frame(),
                    _ => true,
                };
                if !keep_running {
                    window_target.exit();
                }
            }
            Event::AboutToWait => driver.window.request_redraw(),
            Event::LoopExiting => {
                driver.host.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Config-derived timing constants, sanitized once at startup.
#[derive(Debug, Clone, Copy)]
struct LoopTiming {
    fixed_dt: Duration,
    fixed_dt_seconds: f32,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    metrics_log_interval: Duration,
    slow_frame_delay: Duration,
    render_fps_cap: Option<u32>,
    frame_budget: Option<Duration>,
}

impl LoopTiming {
    fn from_config(config: &LoopConfig) -> Self {
        let target_tps = config.target_tps.max(1);
        let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
        let render_fps_cap = sanitize_fps_cap(config.max_render_fps);
        Self {
            fixed_dt,
            fixed_dt_seconds: fixed_dt.as_secs_f32(),
            max_frame_delta: non_zero_or(config.max_frame_delta, Duration::from_millis(250)),
            max_ticks_per_frame: config.max_ticks_per_frame.max(1),
            metrics_log_interval: non_zero_or(config.metrics_log_interval, Duration::from_secs(1)),
            slow_frame_delay: resolve_slow_frame_delay(config.simulated_slow_frame_ms),
            render_fps_cap,
            frame_budget: frame_budget_for(render_fps_cap),
        }
    }

    fn log(&self) {
        let render_fps_cap = match self.render_fps_cap {
            Some(cap) => cap.to_string(),
            None => "off".to_string(),
        };
        info!(
            target_tps = (1.0 / self.fixed_dt.as_secs_f64()).round() as u32,
            max_frame_delta_ms = self.max_frame_delta.as_millis() as u64,
            max_ticks_per_frame = self.max_ticks_per_frame,
            metrics_log_interval_ms = self.metrics_log_interval.as_millis() as u64,
            slow_frame_delay_ms = self.slow_frame_delay.as_millis() as u64,
            render_fps_cap = %render_fps_cap,
            "loop_config"
        );
    }
}

/// Everything the winit callback mutates, gathered so each event arm is a
/// short method call.
struct LoopDriver {
    window: &'static Window,
    renderer: Renderer,
    host: SceneHost,
    input: InputCollector,
    metrics: MetricsAccumulator,
    metrics_handle: MetricsHandle,
    timing: LoopTiming,
    accumulator: Duration,
    last_frame_at: Instant,
    last_present_at: Instant,
    applied_title: Option<String>,
    default_title: String,
    overlay_visible: bool,
}

impl LoopDriver {
    fn handle_resize(&mut self, width: u32, height: u32) -> bool {
        self.input.set_window_size(width, height);
        if let Err(error) = self.renderer.resize(width, height) {
            warn!(error = %error, "renderer_resize_failed");
            return false;
        }
        true
    }

    fn handle_keyboard(&mut self, key_event: &winit::event::KeyEvent) -> bool {
        self.input.handle_keyboard_input(key_event);
        if self.input.quit_requested {
            info!(reason = "escape_key", "shutdown_requested");
            return false;
        }
        true
    }

    /// One presented frame: drain the fixed-dt backlog, then draw. Returns
    /// false when the loop should exit.
    fn run_frame(&mut self) -> bool {
        if self.input.take_overlay_toggle_pressed() {
            self.overlay_visible = !self.overlay_visible;
            info!(overlay_visible = self.overlay_visible, "overlay_toggled");
        }

        if self.timing.slow_frame_delay > Duration::ZERO {
            // Explicit debug perturbation only; this is not the FPS cap.
            thread::sleep(self.timing.slow_frame_delay);
        }

        let now = Instant::now();
        let raw_frame_dt = now.saturating_duration_since(self.last_frame_at);
        self.last_frame_at = now;
        self.accumulator = self
            .accumulator
            .saturating_add(raw_frame_dt.min(self.timing.max_frame_delta));

        let plan = plan_sim_steps(
            self.accumulator,
            self.timing.fixed_dt,
            self.timing.max_ticks_per_frame,
        );
        self.accumulator = plan.carried_over;
        for _ in 0..plan.ticks_to_run {
            if !self.run_tick() {
                return false;
            }
        }
        if plan.dropped_backlog > Duration::ZERO {
            warn!(
                dropped_backlog_ms = plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame = self.timing.max_ticks_per_frame,
                "sim_clamp_triggered"
            );
        }

        // Single authoritative FPS cap sleep point for render pacing.
        let since_present = Instant::now().saturating_duration_since(self.last_present_at);
        let cap_sleep = remaining_frame_budget(since_present, self.timing.frame_budget);
        if cap_sleep > Duration::ZERO {
            thread::sleep(cap_sleep);
        }

        if !self.present() {
            return false;
        }

        self.metrics.record_frame(raw_frame_dt);
        if let Some(snapshot) = self.metrics.maybe_snapshot(now) {
            self.metrics_handle.publish(snapshot);
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                entity_count = self.host.world().entity_count(),
                "loop_metrics"
            );
        }
        true
    }

    fn run_tick(&mut self) -> bool {
        let input_snapshot = self.input.snapshot_for_tick();
        let command = self.host.update(self.timing.fixed_dt_seconds, &input_snapshot);
        self.host.apply_pending();

        if command == SceneCommand::HardReset {
            info!("game_reset");
            match self.host.hard_reset() {
                Ok(()) => {
                    self.host.apply_pending();
                    info!(
                        entity_count = self.host.world().entity_count(),
                        "scene_loaded"
                    );
                }
                Err(error) => {
                    warn!(error = %error, "scene_reload_failed");
                    return false;
                }
            }
        }
        self.metrics.record_tick();
        true
    }

    fn present(&mut self) -> bool {
        let overlay = self.overlay_visible.then(|| OverlayData {
            metrics: self.metrics_handle.snapshot(),
            render_fps_cap: self.timing.render_fps_cap,
            slow_frame_delay_ms: self.timing.slow_frame_delay.as_millis() as u64,
            entity_count: self.host.world().entity_count(),
            content_status: "loaded",
            debug_lines: self.host.debug_lines(),
        });
        if let Err(error) = self.renderer.render_world(self.host.world(), overlay.as_ref()) {
            warn!(error = %error, "renderer_draw_failed");
            return false;
        }
        self.last_present_at = Instant::now();

        let next_title = self.host.debug_title();
        if next_title != self.applied_title {
            match &next_title {
                Some(title) => self.window.set_title(title),
                None => self.window.set_title(&self.default_title),
            }
            self.applied_title = next_title;
        }
        true
    }
}

/// Key bindings the loop recognizes. Movement keys are level-triggered
/// through `ActionStates`; the rest fire once per physical press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyBinding {
    Move(InputAction),
    Interact,
    OverlayToggle,
    Save,
    Load,
    Quit,
}

fn binding_for(key: PhysicalKey) -> Option<KeyBinding> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(KeyBinding::Move(InputAction::MoveUp)),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(KeyBinding::Move(InputAction::MoveDown)),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(KeyBinding::Move(InputAction::MoveLeft)),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(KeyBinding::Move(InputAction::MoveRight)),
        KeyCode::Space => Some(KeyBinding::Interact),
        KeyCode::F3 => Some(KeyBinding::OverlayToggle),
        KeyCode::F5 => Some(KeyBinding::Save),
        KeyCode::F9 => Some(KeyBinding::Load),
        KeyCode::Escape => Some(KeyBinding::Quit),
        _ => None,
    }
}

/// Tracks one edge-triggered key: a press fires exactly once no matter how
/// long the key stays down, and re-arms on release.
#[derive(Debug, Default)]
struct EdgeKey {
    is_down: bool,
    fired: bool,
}

impl EdgeKey {
    fn apply(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.is_down {
                    self.fired = true;
                }
                self.is_down = true;
            }
            ElementState::Released => self.is_down = false,
        }
    }

    fn take(&mut self) -> bool {
        std::mem::take(&mut self.fired)
    }
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    interact: EdgeKey,
    overlay_toggle: EdgeKey,
    save: EdgeKey,
    load: EdgeKey,
    pending_zoom_steps: i32,
    action_states: super::input::ActionStates,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn force_quit(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &winit::event::KeyEvent) {
        if let Some(binding) = binding_for(key_event.physical_key) {
            self.apply_binding(binding, key_event.state);
        }
    }

    fn apply_binding(&mut self, binding: KeyBinding, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        match binding {
            KeyBinding::Move(action) => self.action_states.set(action, is_pressed),
            KeyBinding::Interact => self.interact.apply(state),
            KeyBinding::OverlayToggle => self.overlay_toggle.apply(state),
            KeyBinding::Save => self.save.apply(state),
            KeyBinding::Load => self.load.apply(state),
            KeyBinding::Quit => {
                self.action_states.set(InputAction::Quit, is_pressed);
                if is_pressed {
                    self.force_quit();
                }
            }
        }
    }

    fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        let steps = zoom_steps_from_scroll_delta(delta);
        self.pending_zoom_steps = self.pending_zoom_steps.saturating_add(steps);
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    /// Consumes the per-tick edges; held movement keys persist across ticks.
    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        InputSnapshot::new(
            self.quit_requested,
            self.interact.take(),
            self.action_states,
            self.save.take(),
            self.load.take(),
            std::mem::take(&mut self.pending_zoom_steps),
            self.window_width,
            self.window_height,
        )
    }

    fn take_overlay_toggle_pressed(&mut self) -> bool {
        self.overlay_toggle.take()
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    carried_over: Duration,
    dropped_backlog: Duration,
}

/// Splits the accumulated frame time into fixed ticks. When the backlog
/// exceeds the per-frame tick cap the excess is dropped rather than carried,
/// so a long stall cannot snowball into a spiral of catch-up ticks.
fn plan_sim_steps(accumulator: Duration, fixed_dt: Duration, max_ticks_per_frame: u32) -> StepPlan {
    let whole_ticks = accumulator.as_nanos() / fixed_dt.as_nanos().max(1);
    if whole_ticks > u128::from(max_ticks_per_frame) {
        StepPlan {
            ticks_to_run: max_ticks_per_frame,
            carried_over: Duration::ZERO,
            dropped_backlog: accumulator.saturating_sub(fixed_dt * max_ticks_per_frame),
        }
    } else {
        let ticks_to_run = whole_ticks as u32;
        StepPlan {
            ticks_to_run,
            carried_over: accumulator.saturating_sub(fixed_dt * ticks_to_run),
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn non_zero_or(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn sanitize_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn frame_budget_for(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn remaining_frame_budget(elapsed: Duration, budget: Option<Duration>) -> Duration {
    match budget {
        Some(budget) if elapsed < budget => budget - elapsed,
        _ => Duration::ZERO,
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    let override_ms = match env::var(SLOW_FRAME_ENV_VAR) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(ms) => Some(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = raw.as_str(),
                    "invalid slow-frame env var value; falling back to config"
                );
                None
            }
        },
        Err(env::VarError::NotPresent) => None,
        Err(error) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %error,
                "unable to read slow-frame env var; falling back to config"
            );
            None
        }
    };
    Duration::from_millis(override_ms.unwrap_or(config_slow_frame_ms))
}

fn zoom_steps_from_scroll_delta(delta: MouseScrollDelta) -> i32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y.round() as i32,
        MouseScrollDelta::PixelDelta(position) => {
            if position.y > 0.0 {
                1
            } else if position.y < 0.0 {
                -1
            } else {
                0
            }
        }
    }
}
