//! A small in-memory scene the demo console runs against.

use core::any::{Any, TypeId};
use std::rc::Rc;

use console_core::{ComponentSet, HostDirectory, HostObject, Instance, Vector3};

use crate::usercode::{Health, Player, Transform};

pub struct Entity {
    name: String,
    tag: String,
    components: ComponentSet,
}

impl HostObject for Entity {
    fn name(&self) -> &str {
        &self.name
    }

    fn component(&self, owner: TypeId) -> Option<&dyn Any> {
        self.components.get(owner)
    }
}

pub struct Scene {
    entities: Vec<Rc<Entity>>,
    selection: Vec<usize>,
}

impl Scene {
    pub fn demo() -> Self {
        let at = |x, y, z| Transform { position: Vector3 { x, y, z }, ..Transform::default() };
        let mut scene = Scene { entities: Vec::new(), selection: Vec::new() };
        scene.spawn(
            "Player1",
            "Player",
            ComponentSet::new().with(Health::new(100.0)).with(Player::new("Ada")).with(at(0.0, 0.0, 0.0)),
        );
        scene.spawn(
            "Player2",
            "Player",
            ComponentSet::new().with(Health::new(80.0)).with(Player::new("Bo")).with(at(4.0, 0.0, 0.0)),
        );
        scene.spawn("Grunt", "Enemy", ComponentSet::new().with(Health::new(30.0)).with(at(10.0, 0.0, 2.0)));
        scene.spawn("Grunt", "Enemy", ComponentSet::new().with(Health::new(40.0)).with(at(12.0, 0.0, -2.0)));
        scene.spawn("Crate", "Prop", ComponentSet::new().with(at(3.0, 0.0, 3.0)));
        scene.selection.push(0);
        scene
    }

    fn spawn(&mut self, name: &str, tag: &str, components: ComponentSet) {
        self.entities.push(Rc::new(Entity { name: name.to_string(), tag: tag.to_string(), components }));
    }

    fn matching(&self, keep: impl Fn(&Entity) -> bool) -> Vec<Instance> {
        self.entities.iter().filter(|e| keep(e)).map(|e| Rc::clone(e) as Instance).collect()
    }

    fn sorted(mut items: Vec<String>) -> Vec<String> {
        items.sort();
        items.dedup();
        items
    }
}

impl HostDirectory for Scene {
    fn find_by_name(&self, name: &str) -> Option<Instance> {
        self.find_all_by_name(name).into_iter().next()
    }

    fn find_all_by_name(&self, name: &str) -> Vec<Instance> {
        self.matching(|e| e.name == name)
    }

    fn find_first_by_tag(&self, tag: &str) -> Option<Instance> {
        self.find_all_by_tag(tag).into_iter().next()
    }

    fn find_all_by_tag(&self, tag: &str) -> Vec<Instance> {
        self.matching(|e| e.tag == tag)
    }

    fn current_selection(&self) -> Vec<Instance> {
        self.selection.iter().filter_map(|&i| self.entities.get(i)).map(|e| Rc::clone(e) as Instance).collect()
    }

    fn known_names(&self) -> Vec<String> {
        Self::sorted(self.entities.iter().map(|e| e.name.clone()).collect())
    }

    fn known_tags(&self) -> Vec<String> {
        Self::sorted(self.entities.iter().map(|e| e.tag.clone()).collect())
    }
}

// ================= TESTS ==========================
