//! # Console values and type tags
//!
//! Every declared command speaks in terms of two things:
//! - a [`TypeTag`] describing what a parameter or property holds, and
//! - a [`Value`] carrying one piece of data of that type.
//!
//! Rust types opt into the console through [`ConsoleValue`], which gives the
//! type tag and converts to and from [`Value`]. Primitive types, `String`,
//! the small vector types of this module and `Option<T>` are covered here;
//! fieldless enums get an implementation from `#[derive(ConsoleEnum)]`.
//!
//! +-----------+------------------+   +-----------+------------------+
//! | Tag       | Rust type        |   | Tag       | Rust type        |
//! +-----------+------------------+   +-----------+------------------+
//! | bool      | bool             |   | f32 / f64 | f32 / f64        |
//! | char      | char             |   | string    | String           |
//! | i8..i64   | i8..i64, isize   |   | Vector2-4 | Vector2..Vector4 |
//! | u8..u64   | u8..u64, usize   |   | Quaternion| Quaternion       |
//! | enum      | #[derive(ConsoleEnum)] | object | ObjectRef        |
//! | void      | ()               |   | T?        | Option<T>        |
//! +-----------+------------------+   +-----------+------------------+

use core::fmt;
use std::rc::Rc;

use crate::descriptor::InvokeError;
use crate::target::Instance;

/// Two component float vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

/// Three component float vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Four component float vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Rotation stored as four floats, written `x,y,z,w` on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
    }
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Vector4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

impl Quaternion {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

/// Static description of a console-visible enum: its name and member names in
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumInfo {
    pub name: &'static str,
    pub variants: &'static [&'static str],
}

impl EnumInfo {
    pub const fn new(name: &'static str, variants: &'static [&'static str]) -> Self {
        Self { name, variants }
    }

    /// Index of the member named `text`, ignoring ASCII case.
    pub fn find(&self, text: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.eq_ignore_ascii_case(text))
    }

    pub fn variant(&self, index: usize) -> Option<&'static str> {
        self.variants.get(index).copied()
    }
}

/// Declared type of a parameter or value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Void,
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Str,
    Vector2,
    Vector3,
    Vector4,
    Quaternion,
    Enum(EnumInfo),
    /// A host object looked up by name.
    Object,
    Nullable(Box<TypeTag>),
}

impl TypeTag {
    /// Canonical tag for a type name or one of its aliases.
    ///
    /// Names are matched ignoring ASCII case, so `Float`, `single` and `f32`
    /// all collapse to [`TypeTag::F32`].
    pub fn from_alias(name: &str) -> Option<TypeTag> {
        let name = name.trim();
        if let Some(inner) = name.strip_suffix('?') {
            return TypeTag::from_alias(inner).map(|t| TypeTag::Nullable(Box::new(t)));
        }
        let lower = name.to_ascii_lowercase();
        let tag = match lower.as_str() {
            "void" | "()" | "unit" => TypeTag::Void,
            "bool" | "boolean" => TypeTag::Bool,
            "char" => TypeTag::Char,
            "i8" | "sbyte" | "int8" => TypeTag::I8,
            "i16" | "short" | "int16" => TypeTag::I16,
            "i32" | "int" | "int32" | "integer" => TypeTag::I32,
            "i64" | "long" | "int64" => TypeTag::I64,
            "isize" => TypeTag::Isize,
            "u8" | "byte" | "uint8" => TypeTag::U8,
            "u16" | "ushort" | "uint16" => TypeTag::U16,
            "u32" | "uint" | "uint32" => TypeTag::U32,
            "u64" | "ulong" | "uint64" => TypeTag::U64,
            "usize" => TypeTag::Usize,
            "f32" | "float" | "single" => TypeTag::F32,
            "f64" | "double" => TypeTag::F64,
            "str" | "string" | "&str" => TypeTag::Str,
            "vector2" | "vec2" => TypeTag::Vector2,
            "vector3" | "vec3" => TypeTag::Vector3,
            "vector4" | "vec4" => TypeTag::Vector4,
            "quaternion" | "quat" => TypeTag::Quaternion,
            "object" => TypeTag::Object,
            _ => return None,
        };
        Some(tag)
    }

    /// The tag with any nullable wrapper removed.
    pub fn unwrap_nullable(&self) -> &TypeTag {
        match self {
            TypeTag::Nullable(inner) => inner.unwrap_nullable(),
            other => other,
        }
    }

    /// Component count for the small float tuple types.
    pub fn tuple_arity(&self) -> Option<usize> {
        match self {
            TypeTag::Vector2 => Some(2),
            TypeTag::Vector3 => Some(3),
            TypeTag::Vector4 | TypeTag::Quaternion => Some(4),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeTag::Void)
    }

    /// Literal completions for closed types: enum members or `true`/`false`.
    pub fn literal_completions(&self) -> Option<Vec<&'static str>> {
        match self.unwrap_nullable() {
            TypeTag::Bool => Some(vec!["true", "false"]),
            TypeTag::Enum(info) => Some(info.variants.to_vec()),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Void => "void",
            TypeTag::Bool => "bool",
            TypeTag::Char => "char",
            TypeTag::I8 => "i8",
            TypeTag::I16 => "i16",
            TypeTag::I32 => "i32",
            TypeTag::I64 => "i64",
            TypeTag::Isize => "isize",
            TypeTag::U8 => "u8",
            TypeTag::U16 => "u16",
            TypeTag::U32 => "u32",
            TypeTag::U64 => "u64",
            TypeTag::Usize => "usize",
            TypeTag::F32 => "f32",
            TypeTag::F64 => "f64",
            TypeTag::Str => "string",
            TypeTag::Vector2 => "Vector2",
            TypeTag::Vector3 => "Vector3",
            TypeTag::Vector4 => "Vector4",
            TypeTag::Quaternion => "Quaternion",
            TypeTag::Enum(info) => info.name,
            TypeTag::Object => "object",
            TypeTag::Nullable(inner) => return write!(f, "{inner}?"),
        };
        f.write_str(name)
    }
}

/// Handle to a host object carried inside a [`Value`].
#[derive(Clone)]
pub struct ObjectRef(pub Instance);

impl ObjectRef {
    pub fn instance(&self) -> &Instance {
        &self.0
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectRef").field(&self.0.name()).finish()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// One typed piece of data flowing into or out of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Unit,
    Bool(bool),
    Char(char),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Vector2(Vector2),
    Vector3(Vector3),
    Vector4(Vector4),
    Quaternion(Quaternion),
    Enum { info: EnumInfo, index: usize },
    Object(ObjectRef),
}

impl Value {
    /// Short name of the variant, used in conversion errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Unit => "void",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Int(_) => "signed integer",
            Value::UInt(_) => "unsigned integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Vector2(_) => "Vector2",
            Value::Vector3(_) => "Vector3",
            Value::Vector4(_) => "Vector4",
            Value::Quaternion(_) => "Quaternion",
            Value::Enum { info, .. } => info.name,
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Unit => f.write_str("()"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::UInt(u) => write!(f, "{u}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Vector2(v) => write!(f, "({}, {})", v.x, v.y),
            Value::Vector3(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            Value::Vector4(v) => write!(f, "({}, {}, {}, {})", v.x, v.y, v.z, v.w),
            Value::Quaternion(q) => write!(f, "({}, {}, {}, {})", q.x, q.y, q.z, q.w),
            Value::Enum { info, index } => f.write_str(info.variant(*index).unwrap_or("?")),
            Value::Object(obj) => f.write_str(obj.0.name()),
        }
    }
}

/// A Rust type that can cross the console boundary.
pub trait ConsoleValue: Sized {
    fn type_tag() -> TypeTag;
    fn from_value(value: &Value) -> Result<Self, InvokeError>;
    fn into_value(self) -> Value;
}

/// A fieldless enum exposed to the console. Implemented by `#[derive(ConsoleEnum)]`.
pub trait ConsoleEnum: Sized {
    const INFO: EnumInfo;
    fn from_index(index: usize) -> Option<Self>;
    fn index(&self) -> usize;
}

/// Shared `from_value` body for derived enums.
pub fn enum_from_value<E: ConsoleEnum>(value: &Value) -> Result<E, InvokeError> {
    match value {
        Value::Enum { info, index } if info.name == E::INFO.name => {
            E::from_index(*index).ok_or_else(|| mismatch(E::INFO.name, value))
        }
        Value::Str(s) => E::INFO
            .find(s)
            .and_then(E::from_index)
            .ok_or_else(|| mismatch(E::INFO.name, value)),
        _ => Err(mismatch(E::INFO.name, value)),
    }
}

/// Shared `into_value` body for derived enums.
pub fn enum_into_value<E: ConsoleEnum>(e: &E) -> Value {
    Value::Enum { info: E::INFO, index: e.index() }
}

fn mismatch(expected: &str, found: &Value) -> InvokeError {
    InvokeError::TypeMismatch {
        expected: expected.to_string(),
        found: found.kind_name().to_string(),
    }
}

// Signed and unsigned integers widen into `Int`/`UInt` and narrow back with a
// range check.
macro_rules! console_int {
    ($ty:ty, $tag:ident, Int) => {
        impl ConsoleValue for $ty {
            fn type_tag() -> TypeTag {
                TypeTag::$tag
            }
            fn from_value(value: &Value) -> Result<Self, InvokeError> {
                match value {
                    Value::Int(i) => <$ty>::try_from(*i).map_err(|_| out_of_range(stringify!($ty), value)),
                    Value::UInt(u) => <$ty>::try_from(*u).map_err(|_| out_of_range(stringify!($ty), value)),
                    _ => Err(mismatch(stringify!($ty), value)),
                }
            }
            fn into_value(self) -> Value {
                Value::Int(self as i64)
            }
        }
    };
    ($ty:ty, $tag:ident, UInt) => {
        impl ConsoleValue for $ty {
            fn type_tag() -> TypeTag {
                TypeTag::$tag
            }
            fn from_value(value: &Value) -> Result<Self, InvokeError> {
                match value {
                    Value::UInt(u) => <$ty>::try_from(*u).map_err(|_| out_of_range(stringify!($ty), value)),
                    Value::Int(i) => <$ty>::try_from(*i).map_err(|_| out_of_range(stringify!($ty), value)),
                    _ => Err(mismatch(stringify!($ty), value)),
                }
            }
            fn into_value(self) -> Value {
                Value::UInt(self as u64)
            }
        }
    };
}

console_int!(i8, I8, Int);
console_int!(i16, I16, Int);
console_int!(i32, I32, Int);
console_int!(i64, I64, Int);
console_int!(isize, Isize, Int);
console_int!(u8, U8, UInt);
console_int!(u16, U16, UInt);
console_int!(u32, U32, UInt);
console_int!(u64, U64, UInt);
console_int!(usize, Usize, UInt);

fn out_of_range(ty: &str, value: &Value) -> InvokeError {
    InvokeError::Failed(format!("{value} is out of range for {ty}"))
}

impl ConsoleValue for f32 {
    fn type_tag() -> TypeTag {
        TypeTag::F32
    }
    fn from_value(value: &Value) -> Result<Self, InvokeError> {
        f64::from_value(value).map(|x| x as f32)
    }
    fn into_value(self) -> Value {
        // Going through the shortest decimal form keeps `0.1f32` printing as 0.1.
        Value::Float(self.to_string().parse().unwrap_or(self as f64))
    }
}

impl ConsoleValue for f64 {
    fn type_tag() -> TypeTag {
        TypeTag::F64
    }
    fn from_value(value: &Value) -> Result<Self, InvokeError> {
        match value {
            Value::Float(x) => Ok(*x),
            Value::Int(i) => Ok(*i as f64),
            Value::UInt(u) => Ok(*u as f64),
            _ => Err(mismatch("f64", value)),
        }
    }
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl ConsoleValue for bool {
    fn type_tag() -> TypeTag {
        TypeTag::Bool
    }
    fn from_value(value: &Value) -> Result<Self, InvokeError> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(mismatch("bool", value)),
        }
    }
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ConsoleValue for char {
    fn type_tag() -> TypeTag {
        TypeTag::Char
    }
    fn from_value(value: &Value) -> Result<Self, InvokeError> {
        match value {
            Value::Char(c) => Ok(*c),
            _ => Err(mismatch("char", value)),
        }
    }
    fn into_value(self) -> Value {
        Value::Char(self)
    }
}

impl ConsoleValue for String {
    fn type_tag() -> TypeTag {
        TypeTag::Str
    }
    fn from_value(value: &Value) -> Result<Self, InvokeError> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            _ => Err(mismatch("string", value)),
        }
    }
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl ConsoleValue for () {
    fn type_tag() -> TypeTag {
        TypeTag::Void
    }
    fn from_value(value: &Value) -> Result<Self, InvokeError> {
        match value {
            Value::Unit | Value::Null => Ok(()),
            _ => Err(mismatch("void", value)),
        }
    }
    fn into_value(self) -> Value {
        Value::Unit
    }
}

macro_rules! console_tuple {
    ($ty:ident) => {
        impl ConsoleValue for $ty {
            fn type_tag() -> TypeTag {
                TypeTag::$ty
            }
            fn from_value(value: &Value) -> Result<Self, InvokeError> {
                match value {
                    Value::$ty(v) => Ok(*v),
                    _ => Err(mismatch(stringify!($ty), value)),
                }
            }
            fn into_value(self) -> Value {
                Value::$ty(self)
            }
        }
    };
}

console_tuple!(Vector2);
console_tuple!(Vector3);
console_tuple!(Vector4);
console_tuple!(Quaternion);

impl ConsoleValue for ObjectRef {
    fn type_tag() -> TypeTag {
        TypeTag::Object
    }
    fn from_value(value: &Value) -> Result<Self, InvokeError> {
        match value {
            Value::Object(obj) => Ok(obj.clone()),
            _ => Err(mismatch("object", value)),
        }
    }
    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

impl<T: ConsoleValue> ConsoleValue for Option<T> {
    fn type_tag() -> TypeTag {
        TypeTag::Nullable(Box::new(T::type_tag()))
    }
    fn from_value(value: &Value) -> Result<Self, InvokeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

// ================= TESTS ==========================
