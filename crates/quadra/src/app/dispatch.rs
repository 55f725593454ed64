use std::collections::{BTreeMap, HashMap};

use super::entity::Entity;
use super::event::EventKey;

pub(crate) type InputHandler = Box<dyn FnMut()>;
pub(crate) type TimerHandler = Box<dyn FnMut()>;
pub(crate) type CollisionListener = Box<dyn FnMut(&Entity, &Entity)>;

/// Number of whole frames approximating `delay_ms` at the given frame
/// rate. Zero means the requested delay is finer than one frame.
pub fn timer_period(target_fps: u32, delay_ms: u32) -> u64 {
    ((target_fps as f64 / 1000.0) * delay_ms as f64).round() as u64
}

/// Frame-cadence timer gate: a delay fires whenever the frame counter is
/// a multiple of its period, or every frame when the period rounds to
/// zero. Time here is frame cadence, not wall clock; drift at off-target
/// frame rates is accepted.
pub fn timer_fires(target_fps: u32, frame: u64, delay_ms: u32) -> bool {
    let period = timer_period(target_fps, delay_ms);
    if period > 0 {
        frame % period == 0
    } else {
        true
    }
}

/// Key- and delay-indexed handler lookup for discrete input and timer
/// events. Registration is last-write-wins on key collision; there is no
/// unregister, handlers live as long as the registry.
#[derive(Default)]
pub(crate) struct DispatchRegistry {
    input_handlers: HashMap<EventKey, InputHandler>,
    timer_handlers: BTreeMap<u32, TimerHandler>,
    collision_listener: Option<CollisionListener>,
}

impl DispatchRegistry {
    pub(crate) fn register_input_handler(&mut self, key: EventKey, handler: InputHandler) {
        self.input_handlers.insert(key, handler);
    }

    pub(crate) fn register_timer_handler(&mut self, delay_ms: u32, handler: TimerHandler) {
        self.timer_handlers.insert(delay_ms, handler);
    }

    pub(crate) fn set_collision_listener(&mut self, listener: CollisionListener) {
        self.collision_listener = Some(listener);
    }

    pub(crate) fn collision_listener_mut(&mut self) -> Option<&mut CollisionListener> {
        self.collision_listener.as_mut()
    }

    pub(crate) fn fire_input(&mut self, key: EventKey) {
        if let Some(handler) = self.input_handlers.get_mut(&key) {
            handler();
        }
    }

    /// Runs every timer handler whose delay matches the current frame
    /// cadence (see [`timer_fires`]). Handlers run in delay order.
    pub(crate) fn fire_timer_handlers(&mut self, target_fps: u32, frame: u64) {
        for (delay_ms, handler) in self.timer_handlers.iter_mut() {
            if timer_fires(target_fps, frame, *delay_ms) {
                handler();
            }
        }
    }
}
