//! # Command cache
//!
//! Built once from a [`TypeUniverse`], read by parsing, dispatch and
//! prediction. A cache is never mutated after [`CommandCache::build`]
//! returns; a rebuild produces a new cache and swaps it into a
//! [`CacheSlot`], so callers holding an older snapshot keep working on it.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::{debug, trace};

use crate::descriptor::{CommandKind, MemberDescriptor, OwnerType};

/// One discovery source: a function generated by the declaration macros (or
/// written by hand) returning the descriptors of one type.
pub type CommandSource = fn() -> Vec<MemberDescriptor>;

/// The ordered set of sources a cache is built from. Later sources shadow
/// earlier ones on name collisions.
#[derive(Clone, Default)]
pub struct TypeUniverse {
    sources: Vec<CommandSource>,
}

impl TypeUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, source: CommandSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn push(&mut self, source: CommandSource) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Every descriptor of every source, in registration order.
    pub fn discover(&self) -> Vec<MemberDescriptor> {
        self.sources.iter().flat_map(|source| source()).collect()
    }
}

/// Lookup tables keyed by command name.
#[derive(Debug, Default)]
pub struct CommandCache {
    callables: BTreeMap<String, MemberDescriptor>,
    readable: BTreeMap<String, MemberDescriptor>,
    writable: BTreeMap<String, MemberDescriptor>,
    owner_by_name: BTreeMap<String, OwnerType>,
    static_by_name: BTreeMap<String, bool>,
}

impl CommandCache {
    /// Scans `universe` once and builds a fresh cache.
    pub fn build(include_private: bool, universe: &TypeUniverse) -> Self {
        Self::from_descriptors(include_private, universe.discover())
    }

    /// Builds a cache from an already discovered descriptor list.
    pub fn from_descriptors(include_private: bool, descriptors: impl IntoIterator<Item = MemberDescriptor>) -> Self {
        let mut cache = Self::default();
        let mut skipped = 0usize;

        for descriptor in descriptors {
            if !descriptor.is_visible(include_private) {
                trace!(name = descriptor.name(), owner = descriptor.owner().name, "private member skipped");
                skipped += 1;
                continue;
            }
            cache.insert(descriptor);
        }

        debug!(
            callables = cache.callables.len(),
            readable = cache.readable.len(),
            writable = cache.writable.len(),
            skipped,
            "command cache built"
        );
        cache
    }

    fn insert(&mut self, descriptor: MemberDescriptor) {
        let name = descriptor.name().to_string();
        self.owner_by_name.insert(name.clone(), descriptor.owner());
        self.static_by_name.insert(name.clone(), descriptor.is_static());

        let map = match descriptor.kind() {
            CommandKind::Callable => &mut self.callables,
            CommandKind::ReadableValue => &mut self.readable,
            CommandKind::WritableValue => &mut self.writable,
        };
        if let Some(shadowed) = map.insert(name, descriptor) {
            trace!(name = shadowed.name(), owner = shadowed.owner().name, "command shadowed");
        }
    }

    fn map(&self, kind: CommandKind) -> &BTreeMap<String, MemberDescriptor> {
        match kind {
            CommandKind::Callable => &self.callables,
            CommandKind::ReadableValue => &self.readable,
            CommandKind::WritableValue => &self.writable,
        }
    }

    /// The descriptor registered under `name` for `kind`. Names are matched
    /// ignoring case.
    pub fn lookup(&self, name: &str, kind: CommandKind) -> Option<&MemberDescriptor> {
        let map = self.map(kind);
        map.get(name).or_else(|| map.get(&name.to_lowercase()))
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// Descriptors across the three command maps.
    pub fn total_count(&self) -> usize {
        self.callables.len() + self.readable.len() + self.writable.len()
    }

    /// Sorted names registered for `kind`.
    pub fn names(&self, kind: CommandKind) -> impl Iterator<Item = &str> + '_ {
        self.map(kind).keys().map(String::as_str)
    }

    /// Descriptors registered for `kind`, sorted by name.
    pub fn descriptors(&self, kind: CommandKind) -> impl Iterator<Item = &MemberDescriptor> + '_ {
        self.map(kind).values()
    }

    /// Sorted, deduplicated union of all command names.
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .callables
            .keys()
            .chain(self.readable.keys())
            .chain(self.writable.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn owner_of(&self, name: &str) -> Option<OwnerType> {
        self.owner_by_name.get(name).copied()
    }

    pub fn is_static(&self, name: &str) -> Option<bool> {
        self.static_by_name.get(name).copied()
    }
}

/// Holder of the current cache snapshot.
///
/// Readers clone the `Arc` once per call; writers build a new cache outside
/// the lock and swap it in.
pub struct CacheSlot {
    current: RwLock<Arc<CommandCache>>,
}

impl Default for CacheSlot {
    fn default() -> Self {
        Self::new(CommandCache::default())
    }
}

impl CacheSlot {
    pub fn new(cache: CommandCache) -> Self {
        Self { current: RwLock::new(Arc::new(cache)) }
    }

    pub fn snapshot(&self) -> Arc<CommandCache> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Installs `cache` and returns the snapshot that was current before.
    pub fn replace(&self, cache: CommandCache) -> Arc<CommandCache> {
        let fresh = Arc::new(cache);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = core::mem::replace(&mut *guard, fresh);
        debug!(previous = previous.total_count(), current = guard.total_count(), "command cache swapped");
        previous
    }

    /// Builds a new cache from `universe` and installs it.
    pub fn rebuild(&self, include_private: bool, universe: &TypeUniverse) -> Arc<CommandCache> {
        self.replace(CommandCache::build(include_private, universe));
        self.snapshot()
    }
}

/// The process-wide slot, created empty on first use.
pub fn global() -> &'static CacheSlot {
    static GLOBAL: OnceLock<CacheSlot> = OnceLock::new();
    GLOBAL.get_or_init(CacheSlot::default)
}

// ================= TESTS ==========================
