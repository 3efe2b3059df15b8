//! Small host used by the unit tests: a handful of named, tagged entities
//! and hand-built descriptors over two component types.

use core::any::{Any, TypeId};
use std::rc::Rc;

use crate::descriptor::{
    InvokeError, MemberDescriptor, MemberKind, OwnerType, ParamSpec, with_component_mut, with_component_ref,
};
use crate::target::{ComponentSet, HostDirectory, HostObject, Instance};
use crate::value::{ConsoleValue, EnumInfo, TypeTag, Value};

pub fn difficulty_info() -> EnumInfo {
    EnumInfo::new("Difficulty", &["Easy", "Normal", "Hard"])
}

#[derive(Debug, Clone, PartialEq)]
pub struct Health {
    pub points: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Player {
    pub score: i32,
    pub difficulty: usize,
}

pub struct Entity {
    name: String,
    tag: String,
    components: ComponentSet,
}

impl Entity {
    pub fn new(name: &str, tag: &str, components: ComponentSet) -> Rc<Self> {
        Rc::new(Self { name: name.to_string(), tag: tag.to_string(), components })
    }

    pub fn health(&self) -> Option<f32> {
        self.components.cell::<Health>().map(|c| c.borrow().points)
    }

    pub fn player(&self) -> Option<Player> {
        self.components.cell::<Player>().map(|c| c.borrow().clone())
    }
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
    pub entities: Vec<Rc<Entity>>,
    selected: Vec<Instance>,
}

impl Scene {
    /// Player1, Player2, Grunt, Crate, Grunt in that order.
    pub fn demo() -> Self {
        let entities = vec![
            Entity::new(
                "Player1",
                "Player",
                ComponentSet::new().with(Health { points: 100.0 }).with(Player::default()),
            ),
            Entity::new(
                "Player2",
                "Player",
                ComponentSet::new().with(Health { points: 80.0 }).with(Player::default()),
            ),
            Entity::new("Grunt", "Enemy", ComponentSet::new().with(Health { points: 30.0 })),
            Entity::new("Crate", "Enemy", ComponentSet::new()),
            Entity::new("Grunt", "Enemy", ComponentSet::new().with(Health { points: 40.0 })),
        ];
        Self { entities, selected: Vec::new() }
    }

    pub fn select(&mut self, name: &str) {
        self.selected = self.find_all_by_name(name);
    }

    pub fn entity(&self, index: usize) -> &Entity {
        &self.entities[index]
    }

    fn instances(&self, keep: impl Fn(&Entity) -> bool) -> Vec<Instance> {
        self.entities
            .iter()
            .filter(|e| keep(e))
            .map(|e| Rc::clone(e) as Instance)
            .collect()
    }
}

impl HostDirectory for Scene {
    fn find_by_name(&self, name: &str) -> Option<Instance> {
        self.find_all_by_name(name).into_iter().next()
    }

    fn find_all_by_name(&self, name: &str) -> Vec<Instance> {
        self.instances(|e| e.name == name)
    }

    fn find_first_by_tag(&self, tag: &str) -> Option<Instance> {
        self.find_all_by_tag(tag).into_iter().next()
    }

    fn find_all_by_tag(&self, tag: &str) -> Vec<Instance> {
        self.instances(|e| e.tag == tag)
    }

    fn current_selection(&self) -> Vec<Instance> {
        self.selected.clone()
    }

    fn known_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entities.iter().map(|e| e.name.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    fn known_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.entities.iter().map(|e| e.tag.clone()).collect();
        tags.sort();
        tags.dedup();
        tags
    }
}

fn health() -> OwnerType {
    OwnerType::of::<Health>()
}

fn player() -> OwnerType {
    OwnerType::of::<Player>()
}

/// Hand-written equivalents of what the derive macros generate.
pub fn health_commands() -> Vec<MemberDescriptor> {
    vec![
        MemberDescriptor::callable(
            "AddHealth",
            health(),
            vec![ParamSpec::new("amount", TypeTag::F32)],
            TypeTag::F32,
            |target, args| {
                let amount = f32::from_value(&args[0])?;
                let points = with_component_mut::<Health, _>(target, |h| {
                    h.points += amount;
                    h.points
                })?;
                Ok(points.into_value())
            },
        ),
        MemberDescriptor::getter("points", health(), TypeTag::F32, |target| {
            Ok(with_component_ref::<Health, _>(target, |h| h.points)?.into_value())
        })
        .with_member_kind(MemberKind::Field),
        MemberDescriptor::setter("points", health(), TypeTag::F32, |target, value| {
            let points = f32::from_value(&value)?;
            with_component_mut::<Health, _>(target, |h| h.points = points)
        })
        .with_member_kind(MemberKind::Field),
        MemberDescriptor::callable("explode", health(), vec![], TypeTag::Void, |target, _| {
            with_component_ref::<Health, _>(target, |h| {
                if h.points >= 0.0 {
                    panic!("boom");
                }
            })?;
            Ok(Value::Unit)
        }),
        MemberDescriptor::callable("drain", health(), vec![], TypeTag::Void, |_, _| {
            Err(InvokeError::failed("health is locked"))
        }),
    ]
}

pub fn player_commands() -> Vec<MemberDescriptor> {
    vec![
        MemberDescriptor::getter("score", player(), TypeTag::I32, |target| {
            Ok(with_component_ref::<Player, _>(target, |p| p.score)?.into_value())
        }),
        MemberDescriptor::setter("score", player(), TypeTag::I32, |target, value| {
            let score = i32::from_value(&value)?;
            with_component_mut::<Player, _>(target, |p| p.score = score)
        }),
        MemberDescriptor::callable(
            "setdifficulty",
            player(),
            vec![ParamSpec::new("level", TypeTag::Enum(difficulty_info()))],
            TypeTag::Void,
            |target, args| {
                let Value::Enum { index, .. } = args[0] else {
                    return Err(InvokeError::TypeMismatch {
                        expected: "Difficulty".into(),
                        found: args[0].kind_name().into(),
                    });
                };
                with_component_mut::<Player, _>(target, |p| p.difficulty = index)?;
                Ok(Value::Unit)
            },
        ),
        MemberDescriptor::callable("cheat", player(), vec![], TypeTag::Void, |target, _| {
            with_component_mut::<Player, _>(target, |p| p.score += 1000)?;
            Ok(Value::Unit)
        })
        .private(true),
        MemberDescriptor::callable("debugdump", player(), vec![], TypeTag::Str, |target, _| {
            Ok(with_component_ref::<Player, _>(target, |p| format!("{p:?}"))?.into_value())
        })
        .private(true)
        .force_include(true),
    ]
}

/// Static commands owned by the scene itself.
pub fn scene_commands() -> Vec<MemberDescriptor> {
    let owner = OwnerType::of::<Scene>();
    vec![
        MemberDescriptor::callable(
            "echo",
            owner,
            vec![ParamSpec::new("text", TypeTag::Str)],
            TypeTag::Str,
            |_, args| Ok(args[0].clone()),
        )
        .into_static(),
        MemberDescriptor::callable(
            "add",
            owner,
            vec![ParamSpec::new("a", TypeTag::I32), ParamSpec::new("b", TypeTag::I32)],
            TypeTag::I32,
            |_, args| Ok((i32::from_value(&args[0])? + i32::from_value(&args[1])?).into_value()),
        )
        .into_static(),
        MemberDescriptor::callable("restart", owner, vec![], TypeTag::Void, |_, _| Ok(Value::Unit)).into_static(),
        MemberDescriptor::getter("version", owner, TypeTag::Str, |_| Ok(Value::Str("1.0".into()))).into_static(),
    ]
}
