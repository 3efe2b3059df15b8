//! Target resolution.
//!
//! The console never enumerates host objects itself. A host hands it a
//! [`HostDirectory`], and the [`TargetResolver`] only owns the selector
//! semantics: first match vs. all matches, and when a selector is an error.

use core::any::{Any, TypeId};
use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

use thiserror::Error;
use tracing::trace;

use crate::grammar::TargetSpec;

/// An object living in the host that commands can be applied to.
pub trait HostObject {
    fn name(&self) -> &str;

    /// The component registered for `owner`, erased as `&RefCell<Owner>`.
    fn component(&self, owner: TypeId) -> Option<&dyn Any>;
}

impl fmt::Debug for dyn HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostObject").field(&self.name()).finish()
    }
}

/// Shared handle to a host object.
pub type Instance = Rc<dyn HostObject>;

/// Object lookups the host provides.
pub trait HostDirectory {
    fn find_by_name(&self, name: &str) -> Option<Instance>;
    fn find_all_by_name(&self, name: &str) -> Vec<Instance>;
    fn find_first_by_tag(&self, tag: &str) -> Option<Instance>;
    fn find_all_by_tag(&self, tag: &str) -> Vec<Instance>;

    /// Objects currently selected in an interactive host.
    fn current_selection(&self) -> Vec<Instance> {
        Vec::new()
    }

    /// Object names offered by prediction after `@`/`@@`.
    fn known_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Tags offered by prediction after `#`/`##`.
    fn known_tags(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A directory with no objects, for hosts that only declare static commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyDirectory;

impl HostDirectory for EmptyDirectory {
    fn find_by_name(&self, _name: &str) -> Option<Instance> {
        None
    }
    fn find_all_by_name(&self, _name: &str) -> Vec<Instance> {
        Vec::new()
    }
    fn find_first_by_tag(&self, _tag: &str) -> Option<Instance> {
        None
    }
    fn find_all_by_tag(&self, _tag: &str) -> Vec<Instance> {
        Vec::new()
    }
}

/// Where commands are being executed from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    /// An editor or other interactive host with a notion of selection.
    #[default]
    Interactive,
    /// A running program without selection; `select` is rejected.
    Runtime,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no object named '{0}'")]
    NoObjectNamed(String),

    #[error("no object tagged '{0}'")]
    NoObjectTagged(String),

    #[error("'select' is only available in an interactive context")]
    SelectionUnavailable,

    #[error("nothing is selected")]
    EmptySelection,
}

/// Applies selector semantics on top of a [`HostDirectory`].
pub struct TargetResolver<'a> {
    directory: &'a dyn HostDirectory,
    context: ExecutionContext,
}

impl<'a> TargetResolver<'a> {
    pub fn new(directory: &'a dyn HostDirectory, context: ExecutionContext) -> Self {
        Self { directory, context }
    }

    pub fn directory(&self) -> &'a dyn HostDirectory {
        self.directory
    }

    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    /// Resolves `spec` to the instances a command applies to, in host order.
    pub fn resolve(&self, spec: &TargetSpec) -> Result<Vec<Instance>, ResolveError> {
        let instances = match spec {
            TargetSpec::None => Vec::new(),
            TargetSpec::ByOwnerName(name) => {
                let found = self.directory.find_by_name(name);
                vec![found.ok_or_else(|| ResolveError::NoObjectNamed(name.clone()))?]
            }
            TargetSpec::AllByOwnerName(name) => {
                let found = self.directory.find_all_by_name(name);
                if found.is_empty() {
                    return Err(ResolveError::NoObjectNamed(name.clone()));
                }
                found
            }
            TargetSpec::ByTag(tag) => {
                let found = self.directory.find_first_by_tag(tag);
                vec![found.ok_or_else(|| ResolveError::NoObjectTagged(tag.clone()))?]
            }
            TargetSpec::AllByTag(tag) => {
                let found = self.directory.find_all_by_tag(tag);
                if found.is_empty() {
                    return Err(ResolveError::NoObjectTagged(tag.clone()));
                }
                found
            }
            TargetSpec::CurrentSelection => {
                if self.context != ExecutionContext::Interactive {
                    return Err(ResolveError::SelectionUnavailable);
                }
                let selected = self.directory.current_selection();
                if selected.is_empty() {
                    return Err(ResolveError::EmptySelection);
                }
                selected
            }
        };
        trace!(?spec, count = instances.len(), "targets resolved");
        Ok(instances)
    }
}

/// Type-keyed component storage hosts can embed in their objects.
///
/// Each component is stored as `RefCell<T>` under `TypeId::of::<T>()`, the
/// layout [`HostObject::component`] is expected to return.
#[derive(Default)]
pub struct ComponentSet {
    slots: Vec<(TypeId, Box<dyn Any>)>,
}

impl ComponentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the component of type `T`.
    pub fn insert<T: 'static>(&mut self, component: T) {
        let id = TypeId::of::<T>();
        let boxed: Box<dyn Any> = Box::new(RefCell::new(component));
        match self.slots.iter_mut().find(|(slot, _)| *slot == id) {
            Some(slot) => slot.1 = boxed,
            None => self.slots.push((id, boxed)),
        }
    }

    pub fn with<T: 'static>(mut self, component: T) -> Self {
        self.insert(component);
        self
    }

    pub fn get(&self, owner: TypeId) -> Option<&dyn Any> {
        self.slots.iter().find(|(id, _)| *id == owner).map(|(_, c)| &**c)
    }

    /// Typed access for host code.
    pub fn cell<T: 'static>(&self) -> Option<&RefCell<T>> {
        self.get(TypeId::of::<T>())?.downcast_ref::<RefCell<T>>()
    }

    pub fn contains(&self, owner: TypeId) -> bool {
        self.slots.iter().any(|(id, _)| *id == owner)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ================= TESTS ==========================
