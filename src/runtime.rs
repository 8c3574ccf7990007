use std::any::{Any, type_name};
use std::fmt::{self, Display, Formatter};

use slab::Slab;

use crate::compare::DEFAULT_DEPTH_LIMIT;
use crate::error::{Error, Result};
use crate::store::Store;

/// Configuration of a [`Runtime`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Config {
    /// Whether caches are consulted. If disabled, every pass recomputes.
    pub memoize: bool,
    /// The depth limit for deep comparisons during a pass.
    pub depth_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { memoize: true, depth_limit: DEFAULT_DEPTH_LIMIT }
    }
}

/// Identifies a mounted instance.
///
/// Slab indices are reused after unmounting, so every id also carries the
/// generation it was mounted in.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct InstanceId {
    index: usize,
    generation: u64,
}

impl Display for InstanceId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// A minimal host that owns instances and their slot storage.
///
/// The runtime does not know about component trees or scheduling. It
/// only hands out stable storage to whatever runs inside
/// [`render`](Self::render).
#[derive(Default)]
pub struct Runtime {
    instances: Slab<Instance>,
    generation: u64,
    config: Config,
}

/// The storage of one instance.
struct Instance {
    generation: u64,
    slots: Vec<Box<dyn Any>>,
    passes: usize,
}

impl Runtime {
    /// Create a runtime with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runtime with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config, ..Self::default() }
    }

    /// The runtime's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create a new instance with empty storage.
    pub fn mount(&mut self) -> InstanceId {
        self.generation += 1;
        let generation = self.generation;
        let index = self.instances.insert(Instance { generation, slots: Vec::new(), passes: 0 });
        let id = InstanceId { index, generation };
        tracing::debug!(%id, "mounted instance");
        id
    }

    /// Destroy an instance, dropping everything stored in its slots.
    pub fn unmount(&mut self, id: InstanceId) -> Result<()> {
        self.get_mut(id)?;
        let instance = self.instances.remove(id.index);
        tracing::debug!(%id, slots = instance.slots.len(), "unmounted instance");
        Ok(())
    }

    /// Whether the instance is currently mounted.
    pub fn is_mounted(&self, id: InstanceId) -> bool {
        self.instances
            .get(id.index)
            .is_some_and(|instance| instance.generation == id.generation)
    }

    /// The number of mounted instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether no instance is mounted.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Run one pass of an instance.
    ///
    /// Slots are handed out by position: the n-th slot acquired during a pass
    /// is the n-th slot of every other pass of the same instance. A pass must
    /// therefore acquire the same slots in the same order every time.
    ///
    /// # Panics
    /// Panics if a slot is acquired with a different type than on the
    /// instance's first pass.
    pub fn render<R>(&mut self, id: InstanceId, f: impl FnOnce(&mut Scope) -> R) -> Result<R> {
        let config = &self.config;
        let instance = self
            .instances
            .get_mut(id.index)
            .filter(|instance| instance.generation == id.generation)
            .ok_or(Error::UnknownInstance(id))?;

        let _span = tracing::debug_span!("render", %id, pass = instance.passes).entered();

        let expected = instance.slots.len();
        let first = instance.passes == 0;
        let mut scope = Scope { id, instance, cursor: 0, config };
        let output = f(&mut scope);
        let found = scope.cursor;
        scope.instance.passes += 1;

        if !first && found != expected {
            return Err(Error::HookCountChanged { instance: id, expected, found });
        }

        Ok(output)
    }

    fn get_mut(&mut self, id: InstanceId) -> Result<&mut Instance> {
        self.instances
            .get_mut(id.index)
            .filter(|instance| instance.generation == id.generation)
            .ok_or(Error::UnknownInstance(id))
    }
}

/// One pass of one instance.
///
/// This is the [`Store`] handed to the closure of [`Runtime::render`].
pub struct Scope<'a> {
    id: InstanceId,
    instance: &'a mut Instance,
    cursor: usize,
    config: &'a Config,
}

impl Scope<'_> {
    /// The instance this pass belongs to.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Whether this is the instance's first pass.
    pub fn is_first_pass(&self) -> bool {
        self.instance.passes == 0
    }
}

impl Store for Scope<'_> {
    fn slot<T: 'static>(&mut self, init: impl FnOnce() -> T) -> &mut T {
        let id = self.id;
        let index = self.cursor;
        self.cursor += 1;

        let slots = &mut self.instance.slots;
        if index == slots.len() {
            slots.push(Box::new(init()));
        }

        slots[index].downcast_mut::<T>().unwrap_or_else(|| {
            panic!(
                "slot {index} of instance {id} does not hold a `{}`; \
                 slots must be acquired in the same order on every pass",
                type_name::<T>(),
            )
        })
    }

    fn memoization_enabled(&self) -> bool {
        self.config.memoize
    }

    fn depth_limit(&self) -> usize {
        self.config.depth_limit
    }
}
