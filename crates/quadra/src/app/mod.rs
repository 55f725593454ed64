mod dispatch;
mod entity;
mod event;
mod loop_runner;
mod metrics;
mod scene;
mod surface;
mod visual;

pub use dispatch::{timer_fires, timer_period};
pub use entity::{Bounds, Entity, EntityId, EntityListener};
pub use event::{Event, EventKey, TimerEvent, UserEventType};
pub use loop_runner::{Engine, EngineConfig, EngineControl, EngineError, SceneId};
pub use metrics::LoopMetricsSnapshot;
pub use scene::Scene;
pub use surface::{Surface, TextureError, TextureId, WinitSurface};
pub use visual::{Visual, VisualError};
