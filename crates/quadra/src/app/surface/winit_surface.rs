use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use pixels::{Pixels, SurfaceTexture};
use tracing::warn;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event as WinitEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::PhysicalKey;
use winit::platform::pump_events::EventLoopExtPumpEvents;
use winit::window::{Window, WindowBuilder};

use crate::app::entity::{Bounds, Entity};
use crate::app::event::{Event, UserEventType};
use crate::app::loop_runner::EngineError;
use crate::app::visual::Visual;

use super::{Surface, TextureError, TextureId};

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const MAX_TEXTURE_DIM: u32 = 8192;
const MAX_USER_EVENT_TYPES: u32 = 0x7FFF;

#[derive(Debug)]
struct Texture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// Production surface: a winit window pumped non-blockingly into an
/// internal event queue, drawn through a pixels framebuffer.
pub struct WinitSurface {
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: (u32, u32),
    queue: VecDeque<Event>,
    textures: Vec<Texture>,
    next_event_type: u32,
    last_cursor: (i32, i32),
}

impl WinitSurface {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, EngineError> {
        let event_loop = EventLoop::new().map_err(EngineError::CreateEventLoop)?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(title)
                .with_inner_size(LogicalSize::new(width as f64, height as f64))
                .build(&event_loop)
                .map_err(EngineError::CreateWindow)?,
        );
        let size = window.inner_size();
        let pixels = build_pixels(Arc::clone(&window), size.width, size.height)
            .map_err(EngineError::CreateRenderer)?;

        Ok(Self {
            event_loop,
            window,
            pixels,
            viewport: (size.width, size.height),
            queue: VecDeque::new(),
            textures: Vec::new(),
            next_event_type: 0,
            last_cursor: (0, 0),
        })
    }

    /// Pumps the winit event loop with a zero timeout, translating window
    /// events into the engine's queue.
    fn pump(&mut self) {
        let Self {
            event_loop,
            window,
            pixels,
            viewport,
            queue,
            last_cursor,
            ..
        } = self;

        let _ = event_loop.pump_events(Some(Duration::ZERO), |event, _window_target| {
            let WinitEvent::WindowEvent { window_id, event } = event else {
                return;
            };
            if window_id != window.id() {
                return;
            }
            match event {
                WindowEvent::CloseRequested => {
                    queue.push_back(Event::Terminate);
                }
                WindowEvent::Resized(new_size) => {
                    resize_pixels(pixels, viewport, window, new_size.width, new_size.height);
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    resize_pixels(pixels, viewport, window, size.width, size.height);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    *last_cursor = (position.x.round() as i32, position.y.round() as i32);
                    queue.push_back(Event::PointerMoved {
                        x: last_cursor.0,
                        y: last_cursor.1,
                    });
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    let (x, y) = *last_cursor;
                    queue.push_back(match state {
                        ElementState::Pressed => Event::PointerPressed { button, x, y },
                        ElementState::Released => Event::PointerReleased { button, x, y },
                    });
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    let (delta_x, delta_y) = wheel_lines_from_delta(delta);
                    queue.push_back(Event::Wheel { delta_x, delta_y });
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if event.state == ElementState::Pressed {
                        if let PhysicalKey::Code(code) = event.physical_key {
                            queue.push_back(Event::KeyPressed(code));
                        }
                    }
                }
                _ => {}
            }
        });
    }
}

impl Surface for WinitSurface {
    fn size(&self) -> (u32, u32) {
        self.viewport
    }

    fn draw_entities(&mut self, entities: &mut [Entity], _time_elapsed_ms: f64) {
        for entity in entities.iter_mut() {
            upload_pending_texture(&mut self.textures, entity);
        }

        let frame = self.pixels.frame_mut();
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }
        for entity in entities.iter() {
            if let Visual::Ready(id) = entity.visual() {
                if let Some(texture) = self.textures.get(id.0 as usize) {
                    blit_texture(frame, self.viewport, entity.bounds(), texture);
                }
            }
        }
    }

    fn present(&mut self) {
        if let Err(error) = self.pixels.render() {
            warn!(error = %error, "renderer_present_failed");
        }
    }

    fn poll_event(&mut self) -> Option<Event> {
        if self.queue.is_empty() {
            self.pump();
        }
        self.queue.pop_front()
    }

    fn register_event_type(&mut self) -> Option<UserEventType> {
        if self.next_event_type >= MAX_USER_EVENT_TYPES {
            return None;
        }
        let event_type = UserEventType::new(self.next_event_type);
        self.next_event_type += 1;
        Some(event_type)
    }

    fn push_event(&mut self, event: Event) {
        self.queue.push_back(event);
    }
}

fn build_pixels(window: Arc<Window>, width: u32, height: u32) -> Result<Pixels<'static>, pixels::Error> {
    let surface = SurfaceTexture::new(width, height, window);
    Pixels::new(width, height, surface)
}

fn resize_pixels(
    pixels: &mut Pixels<'static>,
    viewport: &mut (u32, u32),
    window: &Arc<Window>,
    width: u32,
    height: u32,
) {
    if width == 0 || height == 0 {
        return;
    }
    match build_pixels(Arc::clone(window), width, height) {
        Ok(rebuilt) => {
            *pixels = rebuilt;
            *viewport = (width, height);
        }
        Err(error) => warn!(error = %error, "renderer_resize_failed"),
    }
}

/// Moves an entity's decoded pixels into the texture store. An upload
/// failure is reported once; the visual stays failed and the entity is
/// skipped by the draw pass from then on.
fn upload_pending_texture(textures: &mut Vec<Texture>, entity: &mut Entity) {
    let visual = entity.visual_mut();
    if !matches!(visual, Visual::Decoded(_)) {
        return;
    }
    let Visual::Decoded(image) = std::mem::replace(visual, Visual::Failed) else {
        return;
    };
    match create_texture(textures, image) {
        Ok(id) => *entity.visual_mut() = Visual::Ready(id),
        Err(error) => {
            warn!(entity = ?entity.id(), error = %error, "texture_upload_failed");
        }
    }
}

fn create_texture(textures: &mut Vec<Texture>, image: RgbaImage) -> Result<TextureId, TextureError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::Empty);
    }
    if width > MAX_TEXTURE_DIM || height > MAX_TEXTURE_DIM {
        return Err(TextureError::TooLarge {
            width,
            height,
            limit: MAX_TEXTURE_DIM,
        });
    }
    let id = TextureId(textures.len() as u32);
    textures.push(Texture {
        width,
        height,
        rgba: image.into_raw(),
    });
    Ok(id)
}

/// Nearest-neighbour blit of a texture onto the RGBA frame, scaled to the
/// destination bounds and clipped to the viewport. Zero-extent bounds
/// fill the whole surface (backdrop convention). Fully transparent texels
/// are skipped — cutout transparency only, no blending.
fn blit_texture(frame: &mut [u8], viewport: (u32, u32), dest: Bounds, texture: &Texture) {
    let (view_w, view_h) = viewport;
    if view_w == 0 || view_h == 0 {
        return;
    }
    let (dx, dy, dw, dh) = if dest.width == 0 || dest.height == 0 {
        (0i64, 0i64, view_w as i64, view_h as i64)
    } else {
        (
            dest.x as i64,
            dest.y as i64,
            dest.width as i64,
            dest.height as i64,
        )
    };

    let x_start = dx.max(0);
    let y_start = dy.max(0);
    let x_end = (dx + dw).min(view_w as i64);
    let y_end = (dy + dh).min(view_h as i64);

    for out_y in y_start..y_end {
        let src_y = ((out_y - dy) * texture.height as i64 / dh) as usize;
        for out_x in x_start..x_end {
            let src_x = ((out_x - dx) * texture.width as i64 / dw) as usize;
            let src = (src_y * texture.width as usize + src_x) * 4;
            if texture.rgba[src + 3] == 0 {
                continue;
            }
            let dst = (out_y as usize * view_w as usize + out_x as usize) * 4;
            frame[dst..dst + 4].copy_from_slice(&texture.rgba[src..src + 4]);
        }
    }
}

fn wheel_lines_from_delta(delta: MouseScrollDelta) -> (f32, f32) {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => (x, y),
        MouseScrollDelta::PixelDelta(position) => (
            discrete_wheel_step(position.x),
            discrete_wheel_step(position.y),
        ),
    }
}

fn discrete_wheel_step(pixels: f64) -> f32 {
    if pixels > 0.0 {
        1.0
    } else if pixels < 0.0 {
        -1.0
    } else {
        0.0
    }
}
