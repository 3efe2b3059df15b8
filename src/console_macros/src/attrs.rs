//! `#[command(...)]` marker parsing.
//!
//! +------------------+-------------------------------------------------+
//! | Option           | Meaning                                         |
//! +------------------+-------------------------------------------------+
//! | name = "x"       | command name override (stored lowercase)        |
//! | force            | register even when private members are excluded |
//! | get / set        | method is a property getter / setter            |
//! | readonly         | field gets a getter only                        |
//! | callback         | field holds a function invoked by `call`        |
//! +------------------+-------------------------------------------------+

use syn::{Attribute, LitStr, Meta, Result};

pub const MARKER: &str = "command";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandArgs {
    pub name: Option<String>, // Explicit command name
    pub force: bool,          // Ignore the private-member policy
    pub get: bool,            // Property getter
    pub set: bool,            // Property setter
    pub readonly: bool,       // Field without setter
    pub callback: bool,       // Callback field
}

impl CommandArgs {
    /// Command name for a member called `member`: the override when present,
    /// else the member name with `strip` removed, lowercased.
    pub fn command_name(&self, member: &str, strip: Option<&str>) -> String {
        match &self.name {
            Some(name) => name.trim().to_lowercase(),
            None => {
                let base = strip.and_then(|p| member.strip_prefix(p)).filter(|s| !s.is_empty()).unwrap_or(member);
                base.to_lowercase()
            }
        }
    }
}

pub fn is_marker(attr: &Attribute) -> bool {
    attr.path().is_ident(MARKER)
}

/// The marker among `attrs`, if any.
pub fn find_marker(attrs: &[Attribute]) -> Option<&Attribute> {
    attrs.iter().find(|a| is_marker(a))
}

/// Parses a bare `#[command]` or `#[command(option, ...)]`.
pub fn parse_marker(attr: &Attribute) -> Result<CommandArgs> {
    let mut args = CommandArgs::default();
    if let Meta::Path(_) = &attr.meta {
        return Ok(args);
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            let lit: LitStr = meta.value()?.parse()?;
            if lit.value().trim().is_empty() {
                return Err(meta.error("command name cannot be empty"));
            }
            args.name = Some(lit.value());
        } else if meta.path.is_ident("force") {
            args.force = true;
        } else if meta.path.is_ident("get") {
            args.get = true;
        } else if meta.path.is_ident("set") {
            args.set = true;
        } else if meta.path.is_ident("readonly") {
            args.readonly = true;
        } else if meta.path.is_ident("callback") {
            args.callback = true;
        } else {
            return Err(meta.error("unsupported command option (expected name, force, get, set, readonly or callback)"));
        }
        Ok(())
    })?;

    if args.get && args.set {
        return Err(syn::Error::new_spanned(attr, "a command is either `get` or `set`, not both"));
    }
    Ok(args)
}

// ================= TESTS ==========================
