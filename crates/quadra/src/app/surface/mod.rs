mod winit_surface;

use thiserror::Error;

use super::entity::Entity;
use super::event::{Event, UserEventType};

pub use winit_surface::WinitSurface;

/// Handle to an uploaded texture, valid for the lifetime of the surface
/// that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) u32);

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("texture has a zero dimension")]
    Empty,
    #[error("texture dimensions {width}x{height} exceed the limit of {limit}")]
    TooLarge { width: u32, height: u32, limit: u32 },
}

/// The platform collaborator: owns the drawable surface and the input
/// queue. The engine talks to it exclusively through this trait; teardown
/// is `Drop`.
pub trait Surface {
    /// Current drawable size in pixels.
    fn size(&self) -> (u32, u32);

    /// Clears the frame and draws every drawable entity at its boundary
    /// rectangle (zero-extent entities fill the whole surface). Performs
    /// lazy texture upload for entities still carrying decoded pixels,
    /// reporting an upload failure once and marking the visual failed.
    /// `time_elapsed_ms` is the previous iteration's measured duration.
    fn draw_entities(&mut self, entities: &mut [Entity], time_elapsed_ms: f64);

    /// Presents the drawn frame. Failures must be reported and swallowed;
    /// the frame loop never halts on presentation errors.
    fn present(&mut self);

    /// Non-blocking poll of the next pending event, `None` once the queue
    /// is empty for this iteration.
    fn poll_event(&mut self) -> Option<Event>;

    /// Allocates a fresh synthetic event type, or `None` when the
    /// platform has run out.
    fn register_event_type(&mut self) -> Option<UserEventType>;

    /// Enqueues a synthetic event; it is seen by `poll_event` on a later
    /// iteration.
    fn push_event(&mut self, event: Event);
}
