//! # Retained State Manager
//!
//! Per-widget memory that survives from one frame to the next.
//!
//! Every stored type owns one contiguous buffer. A uid maps to exactly one
//! `(type, slot)` pair:
//! - The first access of a uid constructs its value in the type's buffer.
//! - Later accesses return the same value, mutations included.
//! - Accessing a uid with a different type than it was created with is a
//!   [`StateError::Collision`], never a silent alias.
//!
//! Buffers start at a minimum batch size and double when full. References
//! handed out borrow the manager mutably, so none can be held across an
//! access that might grow a buffer.

use crate::error::{StateError, StateResult};
use crate::uid::{fnv1a, Uid};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Default number of elements a type buffer starts with.
pub const DEFAULT_MIN_BATCH: usize = 16;

/// Identity of a stored type: the FNV-1a hash of its Rust type name.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    hash: u64,
    name: &'static str,
}

impl TypeTag {
    /// Returns the tag of `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        let name = std::any::type_name::<T>();
        Self {
            hash: fnv1a(name),
            name,
        }
    }

    /// Returns the tag hash.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.hash
    }

    /// Returns the Rust type name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({} = {:#018x})", self.name, self.hash)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Type-erased view of a [`TypedBuffer`].
trait ErasedBuffer {
    fn len(&self) -> usize;
    fn capacity(&self) -> usize;
    fn clear(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Contiguous storage for every live value of one type.
struct TypedBuffer<T> {
    values: Vec<T>,
    ctor: fn() -> T,
    min_batch: usize,
}

impl<T: 'static> TypedBuffer<T> {
    fn new(ctor: fn() -> T, min_batch: usize) -> Self {
        Self {
            values: Vec::new(),
            ctor,
            min_batch,
        }
    }

    /// Constructs a new value and returns its slot index.
    fn insert(&mut self) -> usize {
        if self.values.len() == self.values.capacity() {
            let grow = self.values.capacity().max(self.min_batch);
            self.values.reserve_exact(grow);
            tracing::trace!(
                type_name = std::any::type_name::<T>(),
                capacity = self.values.capacity(),
                "state buffer grown"
            );
        }
        self.values.push((self.ctor)());
        self.values.len() - 1
    }
}

impl<T: 'static> ErasedBuffer for TypedBuffer<T> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn capacity(&self) -> usize {
        self.values.capacity()
    }

    fn clear(&mut self) {
        self.values = Vec::new();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Clone, Copy)]
struct Slot {
    tag: TypeTag,
    type_id: TypeId,
    index: usize,
}

/// The retained, type-keyed heap.
///
/// # Example
///
/// ```rust
/// use glint_core::{StateManager, Uid};
///
/// #[derive(Default)]
/// struct Cursor { position: usize }
///
/// let mut state = StateManager::new();
/// state.register_default::<Cursor>();
///
/// let uid = Uid::tag("field");
/// state.storage::<Cursor>(uid)?.position = 4;
/// assert_eq!(state.storage::<Cursor>(uid)?.position, 4);
/// # Ok::<(), glint_core::StateError>(())
/// ```
pub struct StateManager {
    /// One buffer per registered type.
    buffers: HashMap<TypeId, Box<dyn ErasedBuffer>>,
    /// Uid to slot mapping.
    slots: HashMap<Uid, Slot>,
    /// Initial element count of a type buffer.
    min_batch: usize,
}

impl StateManager {
    /// Creates an empty manager with the default minimum batch size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_min_batch(DEFAULT_MIN_BATCH)
    }

    /// Creates an empty manager whose buffers start with `min_batch` elements.
    #[must_use]
    pub fn with_min_batch(min_batch: usize) -> Self {
        Self {
            buffers: HashMap::new(),
            slots: HashMap::with_capacity(256),
            min_batch: min_batch.max(1),
        }
    }

    /// Registers `T` with its constructor.
    ///
    /// Registering a type twice is a no-op: the first constructor wins.
    pub fn register<T: 'static>(&mut self, ctor: fn() -> T) {
        let min_batch = self.min_batch;
        self.buffers
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(TypedBuffer::new(ctor, min_batch)));
    }

    /// Registers `T` constructed by [`Default`].
    pub fn register_default<T: Default + 'static>(&mut self) {
        self.register::<T>(T::default);
    }

    /// Returns true if `T` has been registered.
    #[must_use]
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.buffers.contains_key(&TypeId::of::<T>())
    }

    /// Returns the value stored for `uid`, constructing it on first access.
    ///
    /// # Errors
    ///
    /// - [`StateError::Collision`] if `uid` already holds a different type.
    /// - [`StateError::Unregistered`] if `T` was never registered.
    pub fn storage<T: 'static>(&mut self, uid: Uid) -> StateResult<&mut T> {
        let tag = TypeTag::of::<T>();
        let type_id = TypeId::of::<T>();

        let existing = self.slots.get(&uid).copied();
        if let Some(slot) = existing {
            if slot.type_id != type_id {
                return Err(StateError::Collision {
                    uid,
                    stored: slot.tag,
                    requested: tag,
                });
            }
        }

        let typed = self
            .buffers
            .get_mut(&type_id)
            .and_then(|buffer| buffer.as_any_mut().downcast_mut::<TypedBuffer<T>>())
            .ok_or(StateError::Unregistered {
                type_name: tag.name(),
            })?;

        let index = match existing {
            Some(slot) => slot.index,
            None => {
                let index = typed.insert();
                self.slots.insert(uid, Slot { tag, type_id, index });
                index
            }
        };

        Ok(&mut typed.values[index])
    }

    /// Registers `T` if needed, then returns its value for `uid`.
    ///
    /// # Errors
    ///
    /// [`StateError::Collision`] if `uid` already holds a different type.
    pub fn ensure<T: Default + 'static>(&mut self, uid: Uid) -> StateResult<&mut T> {
        self.register_default::<T>();
        self.storage::<T>(uid)
    }

    /// Returns the value for `uid` without constructing one.
    #[must_use]
    pub fn get<T: 'static>(&self, uid: Uid) -> Option<&T> {
        let slot = self.slots.get(&uid)?;
        if slot.type_id != TypeId::of::<T>() {
            return None;
        }
        self.buffers
            .get(&slot.type_id)?
            .as_any()
            .downcast_ref::<TypedBuffer<T>>()?
            .values
            .get(slot.index)
    }

    /// Returns true if `uid` holds a value of any type.
    #[must_use]
    pub fn contains(&self, uid: Uid) -> bool {
        self.slots.contains_key(&uid)
    }

    /// Number of live values across all types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of registered types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.buffers.len()
    }

    /// Current buffer capacity for `T` (zero if unregistered).
    #[must_use]
    pub fn capacity_of<T: 'static>(&self) -> usize {
        self.buffers
            .get(&TypeId::of::<T>())
            .map_or(0, |buffer| buffer.capacity())
    }

    /// Destroys every stored value and forgets all uids.
    ///
    /// Registrations survive; the next access of any uid constructs a fresh
    /// value.
    pub fn reset(&mut self) {
        let live: usize = self.buffers.values().map(|buffer| buffer.len()).sum();
        for buffer in self.buffers.values_mut() {
            buffer.clear();
        }
        self.slots.clear();
        tracing::debug!(live, types = self.buffers.len(), "state manager reset");
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateManager")
            .field("types", &self.buffers.len())
            .field("values", &self.slots.len())
            .field("min_batch", &self.min_batch)
            .finish()
    }
}
