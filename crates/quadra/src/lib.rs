//! A small fixed-rate 2D engine core: one blocking frame loop that polls
//! the platform surface, dispatches input and frame-cadence timer events
//! to registered handlers and to scene entities, and runs a broad-phase
//! collision scan over the active scene.

pub mod app;

pub use app::{
    timer_fires, timer_period, Bounds, Engine, EngineConfig, EngineControl, EngineError, Entity,
    EntityId, EntityListener, Event, EventKey, LoopMetricsSnapshot, Scene, SceneId, Surface,
    TextureError, TextureId, TimerEvent, UserEventType, Visual, VisualError, WinitSurface,
};
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
