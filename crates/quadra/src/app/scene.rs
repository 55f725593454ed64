use std::path::Path;

use super::entity::{Entity, EntityId};
use super::event::Event;

#[derive(Debug, Default)]
pub(crate) struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub(crate) fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// An ordered, exclusively-owned collection of entities representing one
/// loadable game state. Order is insertion order and is used only for
/// iteration, never priority.
#[derive(Debug, Default)]
pub struct Scene {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    is_loaded: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of the entity and assigns it an id unique within
    /// this scene. Texture registration with the surface happens lazily
    /// at draw time, so entities added to an already-active scene are
    /// picked up on the next frame.
    pub fn add_entity(&mut self, mut entity: Entity) -> EntityId {
        let id = self.allocator.allocate();
        entity.assign_id(id);
        self.entities.push(entity);
        id
    }

    /// Removes and destroys the entity with the given id. O(n) scan by
    /// identity, stopping at the first match — ids are unique within a
    /// scene, so there is never a second one.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        match self
            .entities
            .iter()
            .position(|entity| entity.id() == Some(id))
        {
            Some(index) => {
                self.entities.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id() == Some(id))
    }

    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|entity| entity.id() == Some(id))
    }

    /// Installs a stationary backdrop drawn across the whole surface: a
    /// zero-extent entity (degenerate rectangles never collide) inserted
    /// ahead of everything already in the scene so it draws first.
    pub fn set_background(&mut self, image_path: impl AsRef<Path>) -> EntityId {
        let mut background = Entity::new(image_path, 0, 0, 0, 0);
        let id = self.allocator.allocate();
        background.assign_id(id);
        self.entities.insert(0, background);
        id
    }

    /// Forwards the event to every entity in sequence order, without
    /// early termination.
    pub fn propagate_event(&mut self, event: &Event) {
        for entity in self.entities.iter_mut() {
            entity.handle_event(event);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub(crate) fn set_loaded(&mut self, is_loaded: bool) {
        self.is_loaded = is_loaded;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use winit::keyboard::KeyCode;

    use super::*;
    use crate::app::visual::Visual;

    fn entity(x: i32, y: i32, width: u32, height: u32) -> Entity {
        Entity::with_visual(Visual::Failed, x, y, width, height)
    }

    #[test]
    fn allocator_never_reuses_ids() {
        let mut allocator = EntityIdAllocator::default();
        assert_eq!(allocator.allocate(), EntityId(0));
        assert_eq!(allocator.allocate(), EntityId(1));
        assert_eq!(allocator.allocate(), EntityId(2));
    }

    #[test]
    fn add_assigns_id_and_preserves_insertion_order() {
        let mut scene = Scene::new();
        let first = scene.add_entity(entity(0, 0, 1, 1));
        let second = scene.add_entity(entity(5, 5, 1, 1));

        assert_ne!(first, second);
        let ids: Vec<_> = scene.entities().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![Some(first), Some(second)]);
    }

    #[test]
    fn remove_destroys_and_forgets_the_entity() {
        let mut scene = Scene::new();
        let doomed = scene.add_entity(entity(0, 0, 1, 1));
        let survivor = scene.add_entity(entity(5, 5, 1, 1));

        assert!(scene.remove_entity(doomed));
        assert!(scene.find_entity(doomed).is_none());
        assert!(scene.find_entity(survivor).is_some());
        assert_eq!(scene.entity_count(), 1);

        assert!(!scene.remove_entity(doomed));
    }

    #[test]
    fn background_is_inserted_first_with_degenerate_bounds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut scene = Scene::new();
        scene.add_entity(entity(10, 10, 4, 4));
        let background_id = scene.set_background(dir.path().join("missing.png"));

        let background = &scene.entities()[0];
        assert_eq!(background.id(), Some(background_id));
        assert_eq!(background.width(), 0);
        assert_eq!(background.height(), 0);
        // Degenerate rectangle: collides with nothing, ever.
        assert!(!background.overlaps(&scene.entities()[1]));
    }

    #[test]
    fn propagate_reaches_every_entity_in_order() {
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut scene = Scene::new();
        for tag in ["first", "second", "third"] {
            let mut e = entity(0, 0, 1, 1);
            let order = Rc::clone(&order);
            e.add_input_listener(move |_, _| order.borrow_mut().push(tag));
            scene.add_entity(e);
        }

        scene.propagate_event(&Event::KeyPressed(KeyCode::KeyA));

        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn removed_entity_no_longer_receives_events() {
        let calls = Rc::new(Cell::new(0u32));
        let mut scene = Scene::new();
        let mut e = entity(0, 0, 1, 1);
        let counter = Rc::clone(&calls);
        e.add_input_listener(move |_, _| counter.set(counter.get() + 1));
        let id = scene.add_entity(e);

        scene.propagate_event(&Event::KeyPressed(KeyCode::KeyA));
        assert!(scene.remove_entity(id));
        scene.propagate_event(&Event::KeyPressed(KeyCode::KeyA));

        assert_eq!(calls.get(), 1);
    }
}
