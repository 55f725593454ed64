use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};
use winit::error::{EventLoopError, OsError};

use super::dispatch::DispatchRegistry;
use super::entity::Entity;
use super::event::{Event, EventKey, TimerEvent, UserEventType};
use super::metrics::MetricsAccumulator;
use super::scene::Scene;
use super::surface::{Surface, WinitSurface};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_fps: u32,
    pub metrics_log_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_title: "Quadra".to_string(),
            window_width: 800,
            window_height: 600,
            target_fps: 60,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] pixels::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(usize);

/// Cloneable handle onto the loop's run flag, so application closures can
/// request shutdown. Single-threaded by design, hence `Rc`, not a lock.
/// Quitting takes effect at the top of the next iteration; the frame in
/// progress always completes.
#[derive(Debug, Clone, Default)]
pub struct EngineControl {
    running: Rc<Cell<bool>>,
}

impl EngineControl {
    pub fn quit(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    fn begin_run(&self) {
        self.running.set(true);
    }
}

/// The engine core: owns the platform surface, the dispatch registry and
/// the scenes, and drives the fixed-rate frame loop.
pub struct Engine {
    surface: Box<dyn Surface>,
    dispatch: DispatchRegistry,
    scenes: Vec<Scene>,
    active_scene: Option<usize>,
    control: EngineControl,
    target_fps: u32,
    metrics_log_interval: Duration,
    frame_counter: u64,
    time_elapsed_ms: f64,
    timer_event_type: Option<UserEventType>,
    timer_emission_disabled: bool,
    has_run: bool,
}

impl Engine {
    /// Brings up the production winit/pixels surface. Platform bring-up
    /// failures are fatal and abort construction.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let surface = WinitSurface::new(
            &config.window_title,
            config.window_width,
            config.window_height,
        )?;
        Ok(Self::with_surface(config, Box::new(surface)))
    }

    /// Assembles an engine over an already-constructed surface.
    pub fn with_surface(config: EngineConfig, surface: Box<dyn Surface>) -> Self {
        Self {
            surface,
            dispatch: DispatchRegistry::default(),
            scenes: Vec::new(),
            active_scene: None,
            control: EngineControl::default(),
            target_fps: config.target_fps,
            metrics_log_interval: config.metrics_log_interval,
            frame_counter: 0,
            time_elapsed_ms: 0.0,
            timer_event_type: None,
            timer_emission_disabled: false,
            has_run: false,
        }
    }

    pub fn control(&self) -> EngineControl {
        self.control.clone()
    }

    pub fn quit(&self) {
        self.control.quit();
    }

    pub fn add_scene(&mut self, scene: Scene) -> SceneId {
        self.scenes.push(scene);
        SceneId(self.scenes.len() - 1)
    }

    /// Makes the scene the one the loop draws, scans and propagates to.
    /// Returns false for an unknown id.
    pub fn set_active_scene(&mut self, id: SceneId) -> bool {
        if id.0 >= self.scenes.len() {
            return false;
        }
        if let Some(previous) = self.active_scene.replace(id.0) {
            if previous != id.0 {
                self.scenes[previous].set_loaded(false);
            }
        }
        self.scenes[id.0].set_loaded(true);
        info!(
            scene = id.0,
            entity_count = self.scenes[id.0].entity_count(),
            "scene_activated"
        );
        true
    }

    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.get(id.0)
    }

    pub fn scene_mut(&mut self, id: SceneId) -> Option<&mut Scene> {
        self.scenes.get_mut(id.0)
    }

    /// Last-write-wins: registering the same key again silently replaces
    /// the previous handler.
    pub fn register_input_handler(&mut self, key: EventKey, handler: impl FnMut() + 'static) {
        self.dispatch.register_input_handler(key, Box::new(handler));
    }

    /// Last-write-wins on the delay key, like input handlers.
    pub fn register_timer_handler(&mut self, delay_ms: u32, handler: impl FnMut() + 'static) {
        self.dispatch
            .register_timer_handler(delay_ms, Box::new(handler));
    }

    /// At most one collision listener is active; setting a new one drops
    /// the previous.
    pub fn set_collision_listener(
        &mut self,
        listener: impl FnMut(&Entity, &Entity) + 'static,
    ) {
        self.dispatch.set_collision_listener(Box::new(listener));
    }

    /// Measured duration of the previous loop iteration, sleep included.
    pub fn time_elapsed_ms(&self) -> f64 {
        self.time_elapsed_ms
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface.size()
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// The main loop. Each iteration, in order: drain and delegate
    /// pending events, redraw and present the active scene, advance the
    /// frame counter, scan for collisions, emit the synthetic timer
    /// event, sleep for the fixed frame budget, then measure the
    /// iteration. One run per instance; quitting is the only exit.
    pub fn run(&mut self) {
        if self.has_run {
            warn!("run_already_completed");
            return;
        }
        self.has_run = true;

        let target_fps = self.target_fps.max(1);
        // Fixed-rate pacing: the sleep does not compensate for work done
        // in-iteration, so a frame costs sleep + work.
        let frame_sleep = Duration::from_millis(u64::from(1000 / target_fps));
        let mut metrics = MetricsAccumulator::new(self.metrics_log_interval);
        info!(
            target_fps,
            frame_sleep_ms = frame_sleep.as_millis() as u64,
            "loop_config"
        );

        self.control.begin_run();
        while self.control.is_running() {
            let frame_start = Instant::now();
            self.drain_events();
            self.redraw();
            self.frame_counter = self.frame_counter.wrapping_add(1);
            self.detect_collisions();
            self.emit_timer_event(target_fps);
            thread::sleep(frame_sleep);
            let frame_duration = frame_start.elapsed();
            self.time_elapsed_ms = frame_duration.as_secs_f64() * 1000.0;

            metrics.record_frame(frame_duration);
            if let Some(snapshot) = metrics.maybe_snapshot(Instant::now()) {
                info!(
                    fps = snapshot.fps,
                    frame_time_ms = snapshot.frame_time_ms,
                    frame = self.frame_counter,
                    entity_count = self.active_entity_count(),
                    "loop_metrics"
                );
            }
        }
        info!(frames = self.frame_counter, "shutdown");
    }

    fn drain_events(&mut self) {
        while let Some(event) = self.surface.poll_event() {
            self.delegate_event(event);
        }
    }

    /// Routes one event: terminate flips the run flag, the engine's own
    /// timer event goes through timer-handler matching, everything else
    /// through the input-handler map. Every event is then propagated to
    /// the active scene's entities, terminate included.
    fn delegate_event(&mut self, event: Event) {
        match &event {
            Event::Terminate => {
                info!(reason = "platform_terminate", "shutdown_requested");
                self.control.quit();
            }
            Event::Timer(timer) => {
                if Some(timer.event_type) == self.timer_event_type {
                    self.dispatch
                        .fire_timer_handlers(timer.target_fps, timer.frame);
                }
            }
            _ => {
                if let Some(key) = EventKey::for_event(&event) {
                    self.dispatch.fire_input(key);
                }
            }
        }

        if let Some(index) = self.active_scene {
            self.scenes[index].propagate_event(&event);
        }
    }

    fn redraw(&mut self) {
        let Some(index) = self.active_scene else {
            return;
        };
        let Self {
            surface,
            scenes,
            time_elapsed_ms,
            ..
        } = self;
        surface.draw_entities(scenes[index].entities_mut(), *time_elapsed_ms);
        surface.present();
    }

    /// Broad-phase scan over every ordered pair of distinct entities in
    /// the active scene; both (a, b) and (b, a) are reported. O(N^2)
    /// rectangle tests, no spatial partitioning, no response.
    fn detect_collisions(&mut self) {
        let Some(index) = self.active_scene else {
            return;
        };
        let Self {
            dispatch, scenes, ..
        } = self;
        let Some(listener) = dispatch.collision_listener_mut() else {
            return;
        };
        let entities = scenes[index].entities();
        for a in 0..entities.len() {
            for b in 0..entities.len() {
                if a != b && entities[a].overlaps(&entities[b]) {
                    listener(&entities[a], &entities[b]);
                }
            }
        }
    }

    /// Pushes the per-frame timer event carrying the target frame rate
    /// and the frame counter. The synthetic event type is registered
    /// lazily on first emission; if the surface cannot allocate one,
    /// emission is disabled for the remainder of the run.
    fn emit_timer_event(&mut self, target_fps: u32) {
        if self.timer_emission_disabled {
            return;
        }
        if self.timer_event_type.is_none() {
            match self.surface.register_event_type() {
                Some(event_type) => self.timer_event_type = Some(event_type),
                None => {
                    self.timer_emission_disabled = true;
                    warn!("timer_event_type_unavailable");
                    return;
                }
            }
        }
        if let Some(event_type) = self.timer_event_type {
            self.surface.push_event(Event::Timer(TimerEvent {
                event_type,
                target_fps,
                frame: self.frame_counter,
            }));
        }
    }

    fn active_entity_count(&self) -> usize {
        self.active_scene
            .and_then(|index| self.scenes.get(index))
            .map(Scene::entity_count)
            .unwrap_or(0)
    }
}
