//! The host-facing entry point.
//!
//! ```text
//!   line ──► grammar::parse ──► Dispatcher ──► String
//!                                  │    │
//!               CacheSlot::snapshot    TargetResolver ──► HostDirectory
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheSlot, CommandCache, TypeUniverse};
use crate::descriptor::CommandKind;
use crate::dispatch::Dispatcher;
use crate::error::ConsoleError;
use crate::grammar::parse;
use crate::predict::Predictor;
use crate::target::{ExecutionContext, HostDirectory, TargetResolver};

/// Runtime policy for one console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleOptions {
    /// Register non-public members too.
    pub include_private: bool,
    /// Whether `select` can reach a current selection.
    pub context: ExecutionContext,
    /// Upper bound on prediction results.
    pub max_candidates: usize,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self { include_private: false, context: ExecutionContext::Interactive, max_candidates: 32 }
    }
}

pub struct Console<'a> {
    slot: &'a CacheSlot,
    directory: &'a dyn HostDirectory,
    options: ConsoleOptions,
}

impl<'a> Console<'a> {
    pub fn new(slot: &'a CacheSlot, directory: &'a dyn HostDirectory, options: ConsoleOptions) -> Self {
        Self { slot, directory, options }
    }

    pub fn options(&self) -> &ConsoleOptions {
        &self.options
    }

    /// Builds a new cache from `universe` and swaps it in. Calls already
    /// running keep the snapshot they started with.
    pub fn rebuild(&self, universe: &TypeUniverse) -> Arc<CommandCache> {
        let cache = self.slot.rebuild(self.options.include_private, universe);
        debug!(commands = cache.total_count(), "console rebuilt");
        cache
    }

    pub fn snapshot(&self) -> Arc<CommandCache> {
        self.slot.snapshot()
    }

    /// Parses and runs one command line. Every failure comes back as a line
    /// starting with `Error: `.
    pub fn execute_command(&self, line: &str) -> String {
        let cache = self.slot.snapshot();
        match parse(line) {
            Ok(parsed) => {
                let resolver = TargetResolver::new(self.directory, self.options.context);
                Dispatcher::new(&cache, resolver).execute(&parsed)
            }
            Err(err) => ConsoleError::from(err).to_line(),
        }
    }

    pub fn predict(&self, partial: &str) -> Vec<String> {
        let cache = self.slot.snapshot();
        Predictor::new(&cache, self.directory, self.options.max_candidates).predict(partial)
    }

    pub fn hint(&self, partial: &str) -> Option<String> {
        let cache = self.slot.snapshot();
        Predictor::new(&cache, self.directory, self.options.max_candidates).hint(partial)
    }

    /// Sorted names of every registered command.
    pub fn all_command_names(&self) -> Vec<String> {
        self.slot.snapshot().command_names()
    }

    /// Signature text such as `(method) (f32 amount) returns f32`.
    pub fn command_type_info(&self, name: &str) -> Option<String> {
        let cache = self.slot.snapshot();
        [CommandKind::Callable, CommandKind::ReadableValue, CommandKind::WritableValue]
            .into_iter()
            .find_map(|kind| cache.lookup(name, kind))
            .map(|d| d.signature_text())
    }
}

// ================= TESTS ==========================
