use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use tracing::warn;

use super::dispatch::timer_fires;
use super::event::{Event, TimerEvent};
use super::visual::{Visual, VisualError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

/// Axis-aligned boundary rectangle: position plus extent, integer surface
/// coordinates. Extents are unsigned, so width/height >= 0 holds by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Point membership over the half-open rectangle
    /// `[x, x + width) x [y, y + height)`.
    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        let px = px as i64;
        let py = py as i64;
        px >= self.x as i64
            && px < self.x as i64 + self.width as i64
            && py >= self.y as i64
            && py < self.y as i64 + self.height as i64
    }

    /// Strict overlap: the intersection must be non-empty, so touching
    /// edges do not count and degenerate rectangles never overlap. The
    /// `max(lo) < min(hi)` form excludes zero extents without a special
    /// case.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        let (ax0, ax1) = (self.x as i64, self.x as i64 + self.width as i64);
        let (bx0, bx1) = (other.x as i64, other.x as i64 + other.width as i64);
        let (ay0, ay1) = (self.y as i64, self.y as i64 + self.height as i64);
        let (by0, by1) = (other.y as i64, other.y as i64 + other.height as i64);

        ax0.max(bx0) < ax1.min(bx1) && ay0.max(by0) < ay1.min(by1)
    }
}

/// Listener callback attached to a single entity. Receives the event and
/// the entity it is registered on.
pub type EntityListener = Box<dyn FnMut(&Event, &mut Entity)>;

/// A positioned, sized, drawable unit owned by exactly one [`Scene`].
/// Entities carry their own input listeners (unfiltered) and timer
/// listeners (keyed by delay in milliseconds, gated by the engine's frame
/// cadence).
///
/// [`Scene`]: super::scene::Scene
pub struct Entity {
    id: Option<EntityId>,
    bounds: Bounds,
    visual: Visual,
    input_listeners: Vec<EntityListener>,
    timer_listeners: BTreeMap<u32, EntityListener>,
}

impl Entity {
    /// Builds an entity from an image file. A decode failure is reported
    /// once and leaves the entity drawable-inert but fully valid for
    /// geometry and dispatch.
    pub fn new(image_path: impl AsRef<Path>, x: i32, y: i32, width: u32, height: u32) -> Self {
        let path = image_path.as_ref();
        let visual = match Visual::load(path) {
            Ok(pixels) => Visual::Decoded(pixels),
            Err(error) => {
                warn!(path = %path.display(), error = %error, "visual_load_failed");
                Visual::Failed
            }
        };
        Self::with_visual(visual, x, y, width, height)
    }

    pub fn with_visual(visual: Visual, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            id: None,
            bounds: Bounds::new(x, y, width, height),
            visual,
            input_listeners: Vec::new(),
            timer_listeners: BTreeMap::new(),
        }
    }

    /// `None` until the entity is added to a scene.
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn x(&self) -> i32 {
        self.bounds.x
    }

    pub fn y(&self) -> i32 {
        self.bounds.y
    }

    pub fn set_x(&mut self, x: i32) {
        self.bounds.x = x;
    }

    pub fn set_y(&mut self, y: i32) {
        self.bounds.y = y;
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.bounds.x = x;
        self.bounds.y = y;
    }

    pub fn width(&self) -> u32 {
        self.bounds.width
    }

    pub fn height(&self) -> u32 {
        self.bounds.height
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.bounds.contains_point(x, y)
    }

    pub fn overlaps(&self, other: &Entity) -> bool {
        self.bounds.overlaps(&other.bounds)
    }

    pub fn visual(&self) -> &Visual {
        &self.visual
    }

    pub(crate) fn visual_mut(&mut self) -> &mut Visual {
        &mut self.visual
    }

    /// Registers an unfiltered input listener: it runs for every
    /// non-timer event that reaches this entity.
    pub fn add_input_listener(&mut self, listener: impl FnMut(&Event, &mut Entity) + 'static) {
        self.input_listeners.push(Box::new(listener));
    }

    /// Registers a timer listener keyed by its delay. Registering the
    /// same delay again replaces the previous listener.
    pub fn add_timer_listener(
        &mut self,
        listener: impl FnMut(&Event, &mut Entity) + 'static,
        delay_ms: u32,
    ) {
        self.timer_listeners.insert(delay_ms, Box::new(listener));
    }

    /// Routes an event to the listeners matching its class: timer events
    /// to timer listeners (gated by the frame cadence they were
    /// registered for), everything else to every input listener.
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Timer(timer) => self.handle_timer_event(timer),
            _ => self.handle_input_event(event),
        }
    }

    fn handle_input_event(&mut self, event: &Event) {
        // Listener lists are detached while running so a callback may
        // register further listeners; those are merged back afterwards.
        let mut listeners = std::mem::take(&mut self.input_listeners);
        for listener in listeners.iter_mut() {
            listener(event, self);
        }
        let added_during_dispatch = std::mem::replace(&mut self.input_listeners, listeners);
        self.input_listeners.extend(added_during_dispatch);
    }

    fn handle_timer_event(&mut self, timer: &TimerEvent) {
        let event = Event::Timer(*timer);
        let mut listeners = std::mem::take(&mut self.timer_listeners);
        for (delay_ms, listener) in listeners.iter_mut() {
            if timer_fires(timer.target_fps, timer.frame, *delay_ms) {
                listener(&event, self);
            }
        }
        let added_during_dispatch = std::mem::replace(&mut self.timer_listeners, listeners);
        self.timer_listeners.extend(added_during_dispatch);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("bounds", &self.bounds)
            .field("drawable", &self.visual.is_drawable())
            .field("input_listeners", &self.input_listeners.len())
            .field("timer_listeners", &self.timer_listeners.len())
            .finish()
    }
}
