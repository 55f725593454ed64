use quadra::{Engine, Entity, Event, EventKey, KeyCode, Scene};
use tracing::info;

use super::config::DemoConfig;

const PADDLE_WIDTH: u32 = 80;
const PADDLE_HEIGHT: u32 = 16;
const PADDLE_STEP: i32 = 12;
const BLOCK_SIZE: u32 = 16;
const BLOCK_STEP: i32 = 2;
const BLOCK_DRIFT_DELAY_MS: u32 = 16;
const TICK_DELAY_MS: u32 = 1000;

/// Builds the demo scene and wires the handlers: a backdrop, a paddle
/// steered by arrow keys, a block drifting down on a timer cadence, an
/// escape binding, a once-a-second tick and a collision log.
pub(crate) fn populate(engine: &mut Engine, config: &DemoConfig) {
    let mut scene = Scene::new();
    scene.set_background(config.assets_dir.join("background.png"));
    scene.add_entity(build_paddle(config));
    scene.add_entity(build_block(config));
    let scene_id = engine.add_scene(scene);
    engine.set_active_scene(scene_id);

    let control = engine.control();
    engine.register_input_handler(EventKey::Key(KeyCode::Escape), move || {
        info!(reason = "escape_key", "shutdown_requested");
        control.quit();
    });
    engine.register_timer_handler(TICK_DELAY_MS, || info!("second_elapsed"));
    engine.set_collision_listener(|a, b| {
        info!(a = ?a.id(), b = ?b.id(), "collision");
    });
}

fn build_paddle(config: &DemoConfig) -> Entity {
    let window_width = config.window_width as i32;
    let x = (window_width - PADDLE_WIDTH as i32) / 2;
    let y = config.window_height as i32 - 2 * PADDLE_HEIGHT as i32;
    let mut paddle = Entity::new(
        config.assets_dir.join("paddle.png"),
        x,
        y,
        PADDLE_WIDTH,
        PADDLE_HEIGHT,
    );
    paddle.add_input_listener(move |event, entity| {
        let step = match event {
            Event::KeyPressed(KeyCode::ArrowLeft) => -PADDLE_STEP,
            Event::KeyPressed(KeyCode::ArrowRight) => PADDLE_STEP,
            _ => return,
        };
        let max_x = window_width - entity.width() as i32;
        entity.set_x((entity.x() + step).clamp(0, max_x.max(0)));
    });
    paddle
}

fn build_block(config: &DemoConfig) -> Entity {
    let window_height = config.window_height as i32;
    let x = (config.window_width as i32 - BLOCK_SIZE as i32) / 2;
    let mut block = Entity::new(
        config.assets_dir.join("block.png"),
        x,
        0,
        BLOCK_SIZE,
        BLOCK_SIZE,
    );
    block.add_timer_listener(
        move |_, entity| {
            let next_y = entity.y() + BLOCK_STEP;
            if next_y > window_height {
                entity.set_y(-(BLOCK_SIZE as i32));
            } else {
                entity.set_y(next_y);
            }
        },
        BLOCK_DRIFT_DELAY_MS,
    );
    block
}

#[cfg(test)]
mod tests {
    use quadra::{TimerEvent, UserEventType};

    use super::*;

    fn drive_timer(entity: &mut Entity, target_fps: u32, frame: u64) {
        entity.handle_event(&Event::Timer(TimerEvent {
            event_type: UserEventType::new(0),
            target_fps,
            frame,
        }));
    }

    fn test_config() -> DemoConfig {
        DemoConfig::default()
    }

    #[test]
    fn paddle_moves_and_clamps_at_window_edges() {
        let mut paddle = build_paddle(&test_config());
        let start_x = paddle.x();

        paddle.handle_event(&Event::KeyPressed(KeyCode::ArrowRight));
        assert_eq!(paddle.x(), start_x + PADDLE_STEP);

        for _ in 0..200 {
            paddle.handle_event(&Event::KeyPressed(KeyCode::ArrowLeft));
        }
        assert_eq!(paddle.x(), 0);

        for _ in 0..200 {
            paddle.handle_event(&Event::KeyPressed(KeyCode::ArrowRight));
        }
        assert_eq!(
            paddle.x(),
            test_config().window_width as i32 - PADDLE_WIDTH as i32
        );
    }

    #[test]
    fn paddle_ignores_unrelated_keys() {
        let mut paddle = build_paddle(&test_config());
        let start_x = paddle.x();

        paddle.handle_event(&Event::KeyPressed(KeyCode::KeyQ));
        assert_eq!(paddle.x(), start_x);
    }

    #[test]
    fn block_drifts_on_its_timer_cadence_and_wraps() {
        let config = test_config();
        let mut block = build_block(&config);
        let start_y = block.y();

        // 16 ms at 60 fps: period 1, so the block steps every frame.
        drive_timer(&mut block, 60, 1);
        assert_eq!(block.y(), start_y + BLOCK_STEP);

        let frames_to_bottom =
            (config.window_height as i32 / BLOCK_STEP) as u64 + 2;
        for frame in 2..=frames_to_bottom {
            drive_timer(&mut block, 60, frame);
        }
        assert!(block.y() <= config.window_height as i32);
    }
}
