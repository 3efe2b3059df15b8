//! Executes parsed commands.
//!
//! A command is looked up in the map selected by its verb, its targets are
//! resolved (instance commands only), arguments are coerced against the
//! declared signature, and the invoker runs once statically or once per
//! instance. Each run yields one output line; a failing instance yields an
//! error line without affecting its siblings.

use core::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{trace, warn};

use crate::cache::CommandCache;
use crate::coerce::coerce;
use crate::descriptor::{CommandKind, InvokeError, Invoker, MemberDescriptor};
use crate::error::ConsoleError;
use crate::grammar::{ParsedCommand, Verb};
use crate::target::{Instance, TargetResolver};
use crate::value::Value;

/// Map a verb reads from.
pub fn kind_for(verb: Verb) -> CommandKind {
    match verb {
        Verb::Get => CommandKind::ReadableValue,
        Verb::Set => CommandKind::WritableValue,
        Verb::Call => CommandKind::Callable,
    }
}

pub struct Dispatcher<'a> {
    cache: &'a CommandCache,
    resolver: TargetResolver<'a>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(cache: &'a CommandCache, resolver: TargetResolver<'a>) -> Self {
        Self { cache, resolver }
    }

    /// Runs `parsed` and renders the outcome, one line per result.
    pub fn execute(&self, parsed: &ParsedCommand) -> String {
        match self.run(parsed) {
            Ok(lines) => lines.join("\n"),
            Err(err) => {
                trace!(%err, "command rejected");
                err.to_line()
            }
        }
    }

    /// Fatal errors abort the whole command; per-instance failures are
    /// already rendered into the returned lines.
    pub fn run(&self, parsed: &ParsedCommand) -> Result<Vec<String>, ConsoleError> {
        let name = parsed.command_name.as_str();
        let descriptor = self
            .cache
            .lookup(name, kind_for(parsed.verb))
            .ok_or_else(|| ConsoleError::NotFound { verb: parsed.verb, name: name.to_string() })?;

        let targets = if descriptor.is_static() {
            None
        } else if parsed.target.is_none() {
            return Err(ConsoleError::TargetRequired(descriptor.name().to_string()));
        } else {
            Some(self.resolver.resolve(&parsed.target)?)
        };

        match descriptor.invoker() {
            Invoker::Getter { get, .. } => Ok(self.each(descriptor, targets, |target, label| {
                let value = get(target)?;
                Ok(format!("{label} = {value}"))
            })),

            Invoker::Setter { value_type, set } => {
                let text = parsed.args.first().ok_or_else(|| ConsoleError::Arity {
                    name: descriptor.name().to_string(),
                    expected: 1,
                    got: 0,
                })?;
                let value = coerce(text, value_type, self.resolver.directory())?;
                Ok(self.each(descriptor, targets, |target, label| {
                    set(target, value.clone())?;
                    Ok(format!("{label} set to {value}"))
                }))
            }

            Invoker::Callable { params, returns, call } => {
                if params.len() != parsed.args.len() {
                    return Err(ConsoleError::Arity {
                        name: descriptor.name().to_string(),
                        expected: params.len(),
                        got: parsed.args.len(),
                    });
                }
                let args = params
                    .iter()
                    .zip(&parsed.args)
                    .map(|(param, text)| {
                        coerce(text, &param.declared_type, self.resolver.directory())
                            .map_err(|source| ConsoleError::Argument { param: param.name.clone(), source })
                    })
                    .collect::<Result<Vec<Value>, _>>()?;

                Ok(self.each(descriptor, targets, |target, label| {
                    let value = call(target, &args)?;
                    if returns.is_void() {
                        Ok(format!("Called {label}"))
                    } else {
                        Ok(format!("{label} returned {value}"))
                    }
                }))
            }
        }
    }

    /// Runs `op` statically (`targets == None`) or once per instance.
    fn each<F>(&self, descriptor: &MemberDescriptor, targets: Option<Vec<Instance>>, op: F) -> Vec<String>
    where
        F: Fn(Option<&dyn Any>, &str) -> Result<String, InvokeError>,
    {
        let Some(instances) = targets else {
            return vec![guarded(&op, None, descriptor.name())];
        };

        let owner = descriptor.owner();
        instances
            .iter()
            .map(|instance| {
                let label = format!("{}.{}", instance.name(), descriptor.name());
                match instance.component(owner.id) {
                    Some(component) => guarded(&op, Some(component), &label),
                    None => {
                        ConsoleError::MissingComponent { target: instance.name().to_string(), owner: owner.name }
                            .to_line()
                    }
                }
            })
            .collect()
    }
}

/// One invocation with failures and panics turned into an error line.
fn guarded<F>(op: &F, target: Option<&dyn Any>, label: &str) -> String
where
    F: Fn(Option<&dyn Any>, &str) -> Result<String, InvokeError>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| op(target, label))) {
        Ok(Ok(line)) => line,
        Ok(Err(source)) => {
            warn!(label, %source, "command failed");
            ConsoleError::Invocation { label: label.to_string(), source }.to_line()
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!(label, %message, "command panicked");
            ConsoleError::Panicked { label: label.to_string(), message }.to_line()
        }
    }
}

// ================= TESTS ==========================
