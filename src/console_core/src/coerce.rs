//! Text to typed value conversion.
//!
//! Rules, in priority order:
//! 1. nullable: empty text is `null`, anything else converts to the inner type;
//! 2. vectors/quaternions: comma separated floats, arity must match;
//! 3. bool: `true|1` and `false|0`, ignoring case;
//! 4. enum: member name, ignoring case;
//! 5. object: name handed to the host directory;
//! 6. everything else: primitive parsing. Integers accept `0x`, `0o` and
//!    `0b` prefixes.

use thiserror::Error;

use crate::target::HostDirectory;
use crate::value::{ConsoleValue, ObjectRef, Quaternion, TypeTag, Value, Vector2, Vector3, Vector4};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    #[error("cannot convert '{token}' to {target}")]
    Invalid { token: String, target: String },

    #[error("'{token}' has {got} components, {target} needs {expected}")]
    Components { token: String, target: String, expected: usize, got: usize },

    #[error("'{token}' is not a member of {target} (expected one of: {members})")]
    UnknownMember { token: String, target: String, members: String },

    #[error("no object named '{0}'")]
    NoObjectNamed(String),

    #[error("values of type {0} cannot be entered")]
    Unsupported(String),
}

fn invalid(token: &str, target: &TypeTag) -> CoerceError {
    CoerceError::Invalid { token: token.to_string(), target: target.to_string() }
}

/// Converts `text` into a value of type `target`.
///
/// Only [`TypeTag::Object`] touches `directory`; everything else is pure.
pub fn coerce(text: &str, target: &TypeTag, directory: &dyn HostDirectory) -> Result<Value, CoerceError> {
    if let TypeTag::Nullable(inner) = target {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
            return Ok(Value::Null);
        }
        return coerce(text, inner, directory);
    }

    if let Some(arity) = target.tuple_arity() {
        return parse_tuple(text, target, arity);
    }

    if matches!(target, TypeTag::Bool) {
        if let Some(b) = parse_bool(text) {
            return Ok(Value::Bool(b));
        }
    }

    if let TypeTag::Enum(info) = target {
        return info
            .find(text.trim())
            .map(|index| Value::Enum { info: *info, index })
            .ok_or_else(|| CoerceError::UnknownMember {
                token: text.to_string(),
                target: info.name.to_string(),
                members: info.variants.join(", "),
            });
    }

    if matches!(target, TypeTag::Object) {
        let name = text.trim();
        return directory
            .find_by_name(name)
            .map(|instance| Value::Object(ObjectRef(instance)))
            .ok_or_else(|| CoerceError::NoObjectNamed(name.to_string()));
    }

    parse_primitive(text, target)
}

/// Resolves `type_name` through [`TypeTag::from_alias`] and coerces against it.
pub fn coerce_named(text: &str, type_name: &str, directory: &dyn HostDirectory) -> Result<Value, CoerceError> {
    let target = TypeTag::from_alias(type_name).ok_or_else(|| CoerceError::Unsupported(type_name.to_string()))?;
    coerce(text, &target, directory)
}

/// Accepts `1|true` as `true`, and `0|false` as `false`, ignoring case.
fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s == "1" || s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s == "0" || s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

// Integer parsing with base detection; the sign goes before the prefix (`-0x10`).
macro_rules! parse_int {
    ($name:ident, $ty:ty) => {
        fn $name(s: &str) -> Option<$ty> {
            let s = s.trim();
            let (negative, digits) = match s.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, s.strip_prefix('+').unwrap_or(s)),
            };
            let (radix, digits) = if let Some(stripped) = digits.strip_prefix("0x") {
                (16, stripped)
            } else if let Some(stripped) = digits.strip_prefix("0o") {
                (8, stripped)
            } else if let Some(stripped) = digits.strip_prefix("0b") {
                (2, stripped)
            } else {
                (10, digits)
            };
            if digits.is_empty() || digits.starts_with(['+', '-']) {
                return None;
            }
            let text = if negative { format!("-{digits}") } else { digits.to_string() };
            <$ty>::from_str_radix(&text, radix).ok()
        }
    };
}

parse_int!(parse_i64, i64);
parse_int!(parse_u64, u64);

fn parse_signed(text: &str, target: &TypeTag, min: i64, max: i64) -> Result<Value, CoerceError> {
    match parse_i64(text) {
        Some(v) if (min..=max).contains(&v) => Ok(Value::Int(v)),
        _ => Err(invalid(text, target)),
    }
}

fn parse_unsigned(text: &str, target: &TypeTag, max: u64) -> Result<Value, CoerceError> {
    match parse_u64(text) {
        Some(v) if v <= max => Ok(Value::UInt(v)),
        _ => Err(invalid(text, target)),
    }
}

/// One-character string => `char`.
fn parse_char(s: &str) -> Option<char> {
    let mut it = s.chars();
    let c = it.next()?;
    if it.next().is_none() { Some(c) } else { None }
}

fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

fn parse_primitive(text: &str, target: &TypeTag) -> Result<Value, CoerceError> {
    match target {
        TypeTag::I8 => parse_signed(text, target, i8::MIN.into(), i8::MAX.into()),
        TypeTag::I16 => parse_signed(text, target, i16::MIN.into(), i16::MAX.into()),
        TypeTag::I32 => parse_signed(text, target, i32::MIN.into(), i32::MAX.into()),
        TypeTag::I64 => parse_signed(text, target, i64::MIN, i64::MAX),
        TypeTag::Isize => parse_signed(text, target, isize::MIN as i64, isize::MAX as i64),
        TypeTag::U8 => parse_unsigned(text, target, u8::MAX.into()),
        TypeTag::U16 => parse_unsigned(text, target, u16::MAX.into()),
        TypeTag::U32 => parse_unsigned(text, target, u32::MAX.into()),
        TypeTag::U64 => parse_unsigned(text, target, u64::MAX),
        TypeTag::Usize => parse_unsigned(text, target, usize::MAX as u64),
        TypeTag::F32 => match parse_float(text) {
            Some(x) if !x.is_finite() || x.abs() <= f64::from(f32::MAX) => Ok((x as f32).into_value()),
            _ => Err(invalid(text, target)),
        },
        TypeTag::F64 => parse_float(text).map(Value::Float).ok_or_else(|| invalid(text, target)),
        TypeTag::Char => parse_char(text).map(Value::Char).ok_or_else(|| invalid(text, target)),
        TypeTag::Str => Ok(Value::Str(text.to_string())),
        TypeTag::Void => Err(CoerceError::Unsupported(target.to_string())),
        // Handled by the earlier rules; a bool that reaches here did not parse.
        _ => Err(invalid(text, target)),
    }
}

fn parse_tuple(text: &str, target: &TypeTag, arity: usize) -> Result<Value, CoerceError> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != arity {
        return Err(CoerceError::Components {
            token: text.to_string(),
            target: target.to_string(),
            expected: arity,
            got: parts.len(),
        });
    }

    let mut c = [0f32; 4];
    for (slot, part) in c.iter_mut().zip(&parts) {
        *slot = part.parse::<f32>().map_err(|_| invalid(part, target))?;
    }

    Ok(match target {
        TypeTag::Vector2 => Value::Vector2(Vector2::new(c[0], c[1])),
        TypeTag::Vector3 => Value::Vector3(Vector3::new(c[0], c[1], c[2])),
        TypeTag::Vector4 => Value::Vector4(Vector4::new(c[0], c[1], c[2], c[3])),
        _ => Value::Quaternion(Quaternion::new(c[0], c[1], c[2], c[3])),
    })
}

// ================= TESTS ==========================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Scene, difficulty_info};
    use crate::target::EmptyDirectory;

    fn c(text: &str, target: TypeTag) -> Result<Value, CoerceError> {
        coerce(text, &target, &EmptyDirectory)
    }

    #[test]
    fn test_bool_literals() {
        assert_eq!(c("true", TypeTag::Bool), Ok(Value::Bool(true)));
        assert_eq!(c("TRUE", TypeTag::Bool), Ok(Value::Bool(true)));
        assert_eq!(c("1", TypeTag::Bool), Ok(Value::Bool(true)));
        assert_eq!(c("0", TypeTag::Bool), Ok(Value::Bool(false)));
        assert_eq!(c("False", TypeTag::Bool), Ok(Value::Bool(false)));
        assert!(matches!(c("yes", TypeTag::Bool), Err(CoerceError::Invalid { .. })));
    }

    #[test]
    fn test_vectors() {
        assert_eq!(c("1,2,3", TypeTag::Vector3), Ok(Value::Vector3(Vector3::new(1.0, 2.0, 3.0))));
        assert_eq!(c(" 1.5 , -2 ", TypeTag::Vector2), Ok(Value::Vector2(Vector2::new(1.5, -2.0))));
        assert_eq!(
            c("0,0,0,1", TypeTag::Quaternion),
            Ok(Value::Quaternion(Quaternion::new(0.0, 0.0, 0.0, 1.0)))
        );
        assert_eq!(
            c("1,2", TypeTag::Vector3),
            Err(CoerceError::Components { token: "1,2".into(), target: "Vector3".into(), expected: 3, got: 2 })
        );
        assert!(matches!(c("1,x,3", TypeTag::Vector3), Err(CoerceError::Invalid { .. })));
    }

    #[test]
    fn test_integers() {
        assert_eq!(c("42", TypeTag::I32), Ok(Value::Int(42)));
        assert_eq!(c("-7", TypeTag::I8), Ok(Value::Int(-7)));
        assert_eq!(c("0x1F", TypeTag::U8), Ok(Value::UInt(31)));
        assert_eq!(c("0b101", TypeTag::U16), Ok(Value::UInt(5)));
        assert_eq!(c("0o17", TypeTag::U32), Ok(Value::UInt(15)));
        assert_eq!(c("-0x10", TypeTag::I64), Ok(Value::Int(-16)));
        assert!(c("256", TypeTag::U8).is_err());
        assert!(c("-1", TypeTag::U32).is_err());
        assert!(c("--1", TypeTag::I32).is_err());
        assert!(c("0x", TypeTag::I32).is_err());
    }

    #[test]
    fn test_bogus_int_names_token_and_type() {
        let err = c("bogus", TypeTag::I32).unwrap_err();
        assert_eq!(err.to_string(), "cannot convert 'bogus' to i32");
    }

    #[test]
    fn test_floats_and_text() {
        assert_eq!(c("2.5", TypeTag::F32), Ok(Value::Float(2.5)));
        assert_eq!(c("1e3", TypeTag::F64), Ok(Value::Float(1000.0)));
        assert!(c("1e300", TypeTag::F32).is_err());
        assert_eq!(c("x", TypeTag::Char), Ok(Value::Char('x')));
        assert!(c("xy", TypeTag::Char).is_err());
        assert_eq!(c("hello world", TypeTag::Str), Ok(Value::Str("hello world".into())));
        assert_eq!(c("", TypeTag::Void), Err(CoerceError::Unsupported("void".into())));
    }

    #[test]
    fn test_enums_ignore_case() {
        let info = difficulty_info();
        assert_eq!(c("hard", TypeTag::Enum(info)), Ok(Value::Enum { info, index: 2 }));
        let err = c("nightmare", TypeTag::Enum(info)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "'nightmare' is not a member of Difficulty (expected one of: Easy, Normal, Hard)"
        );
    }

    #[test]
    fn test_nullable() {
        let tag = TypeTag::Nullable(Box::new(TypeTag::I32));
        assert_eq!(c("", tag.clone()), Ok(Value::Null));
        assert_eq!(c("NULL", tag.clone()), Ok(Value::Null));
        assert_eq!(c("5", tag), Ok(Value::Int(5)));
    }

    #[test]
    fn test_objects_use_directory() {
        let scene = Scene::demo();
        let found = coerce("Player2", &TypeTag::Object, &scene).unwrap();
        assert_eq!(found.to_string(), "Player2");
        assert_eq!(
            coerce("Nobody", &TypeTag::Object, &scene),
            Err(CoerceError::NoObjectNamed("Nobody".into()))
        );
    }

    #[test]
    fn test_named_aliases() {
        assert_eq!(coerce_named("3", "int", &EmptyDirectory), Ok(Value::Int(3)));
        assert_eq!(coerce_named("true", "Boolean", &EmptyDirectory), Ok(Value::Bool(true)));
        assert_eq!(coerce_named("1,1", "vec2", &EmptyDirectory), Ok(Value::Vector2(Vector2::new(1.0, 1.0))));
        assert!(matches!(coerce_named("x", "matrix", &EmptyDirectory), Err(CoerceError::Unsupported(_))));
    }
}
