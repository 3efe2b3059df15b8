//! Command registry and dispatch engine for an embeddable text console.
//!
//! Application types declare console commands with the `console_macros`
//! attributes; the generated descriptor lists are registered in a
//! [`TypeUniverse`], built into a [`CommandCache`] and driven through a
//! [`Console`]:
//!
//! ```text
//!   @Player1 set health 50        ##Enemy call god true        call restart
//!   └──┬───┘ └┬┘ └──┬──┘ └┬┘      └──┬──┘ └─┬┘ └┬┘ └─┬┘        └─┬┘ └──┬──┘
//!    target  verb  name  value     target  verb name arg        verb   name
//! ```

pub mod cache;
pub mod coerce;
pub mod console;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod grammar;
pub mod predict;
pub mod target;
pub mod value;

#[cfg(test)]
mod fixtures;

pub use cache::{CacheSlot, CommandCache, CommandSource, TypeUniverse, global};
pub use coerce::{CoerceError, coerce, coerce_named};
pub use console::{Console, ConsoleOptions};
pub use descriptor::{
    CommandKind, InvokeError, Invoker, MemberDescriptor, MemberKind, OwnerType, ParamSpec, with_component_mut,
    with_component_ref,
};
pub use error::ConsoleError;
pub use grammar::{ParseError, ParsedCommand, TargetSpec, Verb, parse};
pub use target::{ComponentSet, EmptyDirectory, ExecutionContext, HostDirectory, HostObject, Instance, ResolveError};
pub use value::{
    ConsoleEnum, ConsoleValue, EnumInfo, ObjectRef, Quaternion, TypeTag, Value, Vector2, Vector3, Vector4,
};
