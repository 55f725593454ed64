use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Identifier for a platform-allocated synthetic event type. The surface
/// hands one out per `register_event_type` call; the engine uses it to
/// recognize its own timer events among the polled queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserEventType(u32);

impl UserEventType {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Typed payload of the engine-synthesized timer event: the target frame
/// rate and the frame counter at emission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub event_type: UserEventType,
    pub target_fps: u32,
    pub frame: u64,
}

/// Everything the engine can pull from the surface's event queue in one
/// frame. Pointer coordinates are surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    PointerMoved { x: i32, y: i32 },
    PointerPressed { button: MouseButton, x: i32, y: i32 },
    PointerReleased { button: MouseButton, x: i32, y: i32 },
    Wheel { delta_x: f32, delta_y: f32 },
    KeyPressed(KeyCode),
    Terminate,
    Timer(TimerEvent),
}

/// Lookup key for input handlers. Pointer-class events are matched by
/// event type alone; key presses are matched by key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKey {
    Key(KeyCode),
    PointerMotion,
    PointerPress,
    PointerRelease,
    Wheel,
}

impl EventKey {
    pub(crate) fn for_event(event: &Event) -> Option<EventKey> {
        match event {
            Event::PointerMoved { .. } => Some(EventKey::PointerMotion),
            Event::PointerPressed { .. } => Some(EventKey::PointerPress),
            Event::PointerReleased { .. } => Some(EventKey::PointerRelease),
            Event::Wheel { .. } => Some(EventKey::Wheel),
            Event::KeyPressed(code) => Some(EventKey::Key(*code)),
            Event::Terminate | Event::Timer(_) => None,
        }
    }
}
