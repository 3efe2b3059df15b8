//! Member descriptors: one immutable record per declared command.
//!
//! A descriptor pairs the command's metadata (name, owner, static or
//! instance) with an [`Invoker`], the typed closure captured at registration
//! time. The invoker also carries the signature, so a callable can never be
//! stored with a getter's thunk.

use core::any::{Any, TypeId};
use core::cell::RefCell;
use core::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::value::{TypeTag, Value};

/// Which map of the cache a descriptor lives in, and which verb reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Callable,
    ReadableValue,
    WritableValue,
}

/// The declared member a command was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Property,
    Field,
    Callback,
}

impl MemberKind {
    pub fn label(self) -> &'static str {
        match self {
            MemberKind::Method => "method",
            MemberKind::Property => "property",
            MemberKind::Field => "field",
            MemberKind::Callback => "callback",
        }
    }
}

/// The Rust type owning a command. Host objects expose components keyed by
/// `id`; `name` is used for messages and type info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerType {
    pub id: TypeId,
    pub name: &'static str,
}

impl OwnerType {
    pub fn of<T: 'static>() -> Self {
        let full = core::any::type_name::<T>();
        // `game::player::Player` -> `Player`, keeping generic arguments intact.
        let base = full.split('<').next().unwrap_or(full);
        let start = base.rfind("::").map_or(0, |i| i + 2);
        Self { id: TypeId::of::<T>(), name: &full[start..] }
    }
}

/// One positional parameter of a callable.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub declared_type: TypeTag,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, declared_type: TypeTag) -> Self {
        Self { name: name.into(), declared_type }
    }
}

impl fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.declared_type, self.name)
    }
}

/// Failure raised while running target code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvokeError {
    #[error("no target instance was supplied")]
    MissingTarget,

    #[error("target does not carry a {0} component")]
    WrongOwner(&'static str),

    #[error("{0} component is already borrowed")]
    Busy(&'static str),

    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("{0}")]
    Failed(String),
}

impl InvokeError {
    /// Wraps an error returned by target code.
    pub fn failed(err: impl fmt::Display) -> Self {
        InvokeError::Failed(err.to_string())
    }
}

pub type CallFn = Arc<dyn Fn(Option<&dyn Any>, &[Value]) -> Result<Value, InvokeError> + Send + Sync>;
pub type GetFn = Arc<dyn Fn(Option<&dyn Any>) -> Result<Value, InvokeError> + Send + Sync>;
pub type SetFn = Arc<dyn Fn(Option<&dyn Any>, Value) -> Result<(), InvokeError> + Send + Sync>;

/// Typed invocation thunk together with its signature.
#[derive(Clone)]
pub enum Invoker {
    Callable { params: Vec<ParamSpec>, returns: TypeTag, call: CallFn },
    Getter { value_type: TypeTag, get: GetFn },
    Setter { value_type: TypeTag, set: SetFn },
}

impl Invoker {
    pub fn kind(&self) -> CommandKind {
        match self {
            Invoker::Callable { .. } => CommandKind::Callable,
            Invoker::Getter { .. } => CommandKind::ReadableValue,
            Invoker::Setter { .. } => CommandKind::WritableValue,
        }
    }
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invoker::Callable { params, returns, .. } => f
                .debug_struct("Callable")
                .field("params", params)
                .field("returns", returns)
                .finish_non_exhaustive(),
            Invoker::Getter { value_type, .. } => {
                f.debug_struct("Getter").field("value_type", value_type).finish_non_exhaustive()
            }
            Invoker::Setter { value_type, .. } => {
                f.debug_struct("Setter").field("value_type", value_type).finish_non_exhaustive()
            }
        }
    }
}

/// Immutable record describing one declared command.
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    name: String,
    member: MemberKind,
    owner: OwnerType,
    is_static: bool,
    is_private: bool,
    force_include: bool,
    invoker: Invoker,
}

impl MemberDescriptor {
    fn with_invoker(name: &str, owner: OwnerType, member: MemberKind, invoker: Invoker) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            member,
            owner,
            is_static: false,
            is_private: false,
            force_include: false,
            invoker,
        }
    }

    /// A callable command (method) taking `params` and returning `returns`.
    pub fn callable<F>(name: &str, owner: OwnerType, params: Vec<ParamSpec>, returns: TypeTag, call: F) -> Self
    where
        F: Fn(Option<&dyn Any>, &[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        let invoker = Invoker::Callable { params, returns, call: Arc::new(call) };
        Self::with_invoker(name, owner, MemberKind::Method, invoker)
    }

    /// A readable value (property getter).
    pub fn getter<F>(name: &str, owner: OwnerType, value_type: TypeTag, get: F) -> Self
    where
        F: Fn(Option<&dyn Any>) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        let invoker = Invoker::Getter { value_type, get: Arc::new(get) };
        Self::with_invoker(name, owner, MemberKind::Property, invoker)
    }

    /// A writable value (property setter).
    pub fn setter<F>(name: &str, owner: OwnerType, value_type: TypeTag, set: F) -> Self
    where
        F: Fn(Option<&dyn Any>, Value) -> Result<(), InvokeError> + Send + Sync + 'static,
    {
        let invoker = Invoker::Setter { value_type, set: Arc::new(set) };
        Self::with_invoker(name, owner, MemberKind::Property, invoker)
    }

    pub fn with_member_kind(mut self, member: MemberKind) -> Self {
        self.member = member;
        self
    }

    /// Marks the command as static: it runs without a target instance.
    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    /// Include this command even when it is private and private members are
    /// excluded globally.
    pub fn force_include(mut self, force: bool) -> Self {
        self.force_include = force;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CommandKind {
        self.invoker.kind()
    }

    pub fn member_kind(&self) -> MemberKind {
        self.member
    }

    pub fn owner(&self) -> OwnerType {
        self.owner
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_private(&self) -> bool {
        self.is_private
    }

    pub fn forces_inclusion(&self) -> bool {
        self.force_include
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Parameters of a callable; empty for value commands.
    pub fn params(&self) -> &[ParamSpec] {
        match &self.invoker {
            Invoker::Callable { params, .. } => params,
            _ => &[],
        }
    }

    /// Return type of a callable, or the value type of a getter/setter.
    pub fn value_type(&self) -> &TypeTag {
        match &self.invoker {
            Invoker::Callable { returns, .. } => returns,
            Invoker::Getter { value_type, .. } | Invoker::Setter { value_type, .. } => value_type,
        }
    }

    /// Whether the visibility policy lets this descriptor into a cache.
    pub fn is_visible(&self, include_private: bool) -> bool {
        !self.is_private || include_private || self.force_include
    }

    /// `(method) (f32 amount) returns f32` style signature text.
    pub fn signature_text(&self) -> String {
        let label = self.member.label();
        let prefix = if self.is_static { format!("(static {label})") } else { format!("({label})") };
        match &self.invoker {
            Invoker::Callable { params, returns, .. } => {
                let list = params.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
                if returns.is_void() {
                    format!("{prefix} ({list})")
                } else {
                    format!("{prefix} ({list}) returns {returns}")
                }
            }
            Invoker::Getter { value_type, .. } | Invoker::Setter { value_type, .. } => {
                format!("{prefix} {value_type}")
            }
        }
    }
}

/// Runs `f` against the component of type `T` behind `target`.
///
/// Host objects hand components out as `&RefCell<T>` erased to `&dyn Any`;
/// a missing target, a foreign component or an outstanding borrow is an
/// [`InvokeError`].
pub fn with_component_ref<T: 'static, R>(target: Option<&dyn Any>, f: impl FnOnce(&T) -> R) -> Result<R, InvokeError> {
    let cell = downcast_cell::<T>(target)?;
    let guard = cell.try_borrow().map_err(|_| InvokeError::Busy(OwnerType::of::<T>().name))?;
    Ok(f(&*guard))
}

/// Mutable counterpart of [`with_component_ref`].
pub fn with_component_mut<T: 'static, R>(
    target: Option<&dyn Any>,
    f: impl FnOnce(&mut T) -> R,
) -> Result<R, InvokeError> {
    let cell = downcast_cell::<T>(target)?;
    let mut guard = cell.try_borrow_mut().map_err(|_| InvokeError::Busy(OwnerType::of::<T>().name))?;
    Ok(f(&mut *guard))
}

fn downcast_cell<T: 'static>(target: Option<&dyn Any>) -> Result<&RefCell<T>, InvokeError> {
    target
        .ok_or(InvokeError::MissingTarget)?
        .downcast_ref::<RefCell<T>>()
        .ok_or(InvokeError::WrongOwner(OwnerType::of::<T>().name))
}

// ================= TESTS ==========================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ConsoleValue;

    struct Turret {
        ammo: u32,
    }

    fn fire_descriptor() -> MemberDescriptor {
        MemberDescriptor::callable(
            "Fire",
            OwnerType::of::<Turret>(),
            vec![ParamSpec::new("rounds", TypeTag::U32)],
            TypeTag::U32,
            |target, args| {
                let rounds = u32::from_value(&args[0])?;
                let left = with_component_mut::<Turret, _>(target, |t| {
                    t.ammo = t.ammo.saturating_sub(rounds);
                    t.ammo
                })?;
                Ok(left.into_value())
            },
        )
    }

    #[test]
    fn test_name_is_lowercased() {
        assert_eq!(fire_descriptor().name(), "fire");
    }

    #[test]
    fn test_owner_name_is_short() {
        let owner = OwnerType::of::<Turret>();
        assert_eq!(owner.name, "Turret");
        assert_eq!(owner.id, TypeId::of::<Turret>());
    }

    #[test]
    fn test_kind_follows_invoker() {
        let d = fire_descriptor();
        assert_eq!(d.kind(), CommandKind::Callable);
        assert_eq!(d.member_kind(), MemberKind::Method);
        assert_eq!(d.params().len(), 1);
        assert_eq!(d.value_type(), &TypeTag::U32);

        let g = MemberDescriptor::getter("ammo", OwnerType::of::<Turret>(), TypeTag::U32, |_| Ok(Value::UInt(0)));
        assert_eq!(g.kind(), CommandKind::ReadableValue);
        assert!(g.params().is_empty());
    }

    #[test]
    fn test_signature_text() {
        assert_eq!(fire_descriptor().signature_text(), "(method) (u32 rounds) returns u32");

        let reset = MemberDescriptor::callable("reset", OwnerType::of::<Turret>(), vec![], TypeTag::Void, |_, _| {
            Ok(Value::Unit)
        })
        .into_static();
        assert_eq!(reset.signature_text(), "(static method) ()");

        let ammo = MemberDescriptor::setter("ammo", OwnerType::of::<Turret>(), TypeTag::U32, |_, _| Ok(()))
            .with_member_kind(MemberKind::Field);
        assert_eq!(ammo.signature_text(), "(field) u32");
    }

    #[test]
    fn test_visibility_policy() {
        let public = fire_descriptor();
        let private = fire_descriptor().private(true);
        let forced = fire_descriptor().private(true).force_include(true);

        assert!(public.is_visible(false));
        assert!(!private.is_visible(false));
        assert!(private.is_visible(true));
        assert!(forced.is_visible(false));
    }

    #[test]
    fn test_component_access() {
        let cell = RefCell::new(Turret { ammo: 10 });
        let d = fire_descriptor();
        let Invoker::Callable { call, .. } = d.invoker() else { panic!("callable expected") };

        let left = call(Some(&cell as &dyn Any), &[Value::UInt(3)]).unwrap();
        assert_eq!(left, Value::UInt(7));
        assert_eq!(cell.borrow().ammo, 7);

        assert_eq!(call(None, &[Value::UInt(1)]), Err(InvokeError::MissingTarget));

        let wrong = RefCell::new(5u8);
        assert_eq!(
            call(Some(&wrong as &dyn Any), &[Value::UInt(1)]),
            Err(InvokeError::WrongOwner("Turret"))
        );
    }

    #[test]
    fn test_busy_component_is_reported() {
        let cell = RefCell::new(Turret { ammo: 1 });
        let _held = cell.borrow_mut();
        let result = with_component_ref::<Turret, _>(Some(&cell as &dyn Any), |t| t.ammo);
        assert_eq!(result, Err(InvokeError::Busy("Turret")));
    }
}
