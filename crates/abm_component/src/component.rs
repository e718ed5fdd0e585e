//! Core [`Component`] trait and type-erased per-holder storage.
//!
//! Every piece of data attached to an agent must implement [`Component`].
//! Components are plain data: they carry no reference back to their owner and
//! have no lifecycle of their own beyond being attached and detached.
//!
//! ## Type Identity
//!
//! [`ComponentTypeId`] is derived from the component's **string name** using
//! the FNV-1a 64-bit hash algorithm, so ids are stable across runs and can be
//! written out by record collectors without a lookup table.

use std::any::Any;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A unique identifier for a component type, derived from its string name
/// using the FNV-1a 64-bit hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] from a component's string name.
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// The core component trait.
///
/// Components are plain data. By default an agent may hold at most one
/// instance of a given component type; types that set
/// [`Component::MULTI_INSTANCE`] may be attached several times to the same
/// agent.
///
/// # Examples
///
/// ```rust
/// use abm_component::Component;
///
/// #[derive(Debug, Clone)]
/// struct Wealth(u32);
///
/// impl Component for Wealth {}
///
/// #[derive(Debug, Clone)]
/// struct Memory(String);
///
/// impl Component for Memory {
///     const MULTI_INSTANCE: bool = true;
///
///     fn type_name() -> &'static str {
///         "Memory"
///     }
/// }
/// ```
pub trait Component: Any + Send + Sync {
    /// Whether an agent may hold more than one instance of this type.
    const MULTI_INSTANCE: bool = false;

    /// A human-readable name for this component type.
    ///
    /// Defaults to the fully qualified Rust type name.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the [`ComponentTypeId`] for this component.
    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }
}

/// Summary of one component type held in a [`ComponentMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotInfo {
    /// The component type.
    pub type_id: ComponentTypeId,
    /// The component's type name.
    pub name: &'static str,
    /// How many instances of the type are held.
    pub instances: usize,
    /// Whether the type allows several instances per holder.
    pub multi: bool,
}

struct Slot {
    name: &'static str,
    multi: bool,
    values: Vec<Box<dyn Any + Send + Sync>>,
}

/// Type-erased component storage for a single holder (an agent, an agent
/// class, or the environment).
///
/// Types are kept in attach order so iteration over a holder's components is
/// deterministic.
#[derive(Default)]
pub struct ComponentMap {
    slots: IndexMap<ComponentTypeId, Slot>,
}

impl ComponentMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a component.
    ///
    /// Returns the value back if the type is single-instance and already
    /// present.
    pub fn insert<T: Component>(&mut self, component: T) -> Result<(), T> {
        let slot = self
            .slots
            .entry(T::component_type_id())
            .or_insert_with(|| Slot {
                name: T::type_name(),
                multi: T::MULTI_INSTANCE,
                values: Vec::new(),
            });
        if !slot.multi && !slot.values.is_empty() {
            return Err(component);
        }
        slot.values.push(Box::new(component));
        Ok(())
    }

    /// Detach the most recently attached instance of `T`.
    pub fn remove<T: Component>(&mut self) -> Option<T> {
        let type_id = T::component_type_id();
        let slot = self.slots.get_mut(&type_id)?;
        let value = slot.values.pop()?;
        if slot.values.is_empty() {
            self.slots.shift_remove(&type_id);
        }
        value.downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Returns the first instance of `T`, if any.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.slots
            .get(&T::component_type_id())?
            .values
            .first()?
            .downcast_ref::<T>()
    }

    /// Returns the first instance of `T` mutably, if any.
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.slots
            .get_mut(&T::component_type_id())?
            .values
            .first_mut()?
            .downcast_mut::<T>()
    }

    /// Returns every instance of `T`, in attach order.
    #[must_use]
    pub fn get_all<T: Component>(&self) -> Vec<&T> {
        self.slots
            .get(&T::component_type_id())
            .map(|slot| {
                slot.values
                    .iter()
                    .filter_map(|value| value.downcast_ref::<T>())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns `true` if at least one instance of the type is held.
    #[must_use]
    pub fn contains_type(&self, type_id: ComponentTypeId) -> bool {
        self.slots.contains_key(&type_id)
    }

    /// Returns the number of instances held for the type.
    #[must_use]
    pub fn count_of(&self, type_id: ComponentTypeId) -> usize {
        self.slots.get(&type_id).map_or(0, |slot| slot.values.len())
    }

    /// Returns a summary of every held type, in attach order.
    #[must_use]
    pub fn slots(&self) -> Vec<SlotInfo> {
        self.slots
            .iter()
            .map(|(type_id, slot)| SlotInfo {
                type_id: *type_id,
                name: slot.name,
                instances: slot.values.len(),
                multi: slot.multi,
            })
            .collect()
    }

    /// Returns the number of distinct component types held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no components are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for ComponentMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slots.values().map(|slot| (slot.name, slot.values.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Health {
        current: f32,
        max: f32,
    }

    impl Component for Health {
        fn type_name() -> &'static str {
            "Health"
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Note(&'static str);

    impl Component for Note {
        const MULTI_INSTANCE: bool = true;
    }

    #[test]
    fn test_component_type_id_matches_from_name() {
        assert_eq!(Health::component_type_id(), ComponentTypeId::from_name("Health"));
        assert_eq!(ComponentTypeId::of::<Health>(), Health::component_type_id());
    }

    #[test]
    fn test_default_type_name_is_rust_path() {
        assert!(Note::type_name().ends_with("Note"));
        assert_ne!(Note::component_type_id(), Health::component_type_id());
    }

    #[test]
    fn test_fnv1a_known_vector() {
        // FNV-1a 64-bit of the empty string is the offset basis itself.
        assert_eq!(
            ComponentTypeId::from_name(""),
            ComponentTypeId(0xcbf2_9ce4_8422_2325)
        );
    }

    #[test]
    fn test_single_instance_rejects_second_insert() {
        let mut map = ComponentMap::new();
        map.insert(Health { current: 1.0, max: 2.0 }).unwrap();
        let rejected = map.insert(Health { current: 5.0, max: 5.0 });
        assert_eq!(rejected, Err(Health { current: 5.0, max: 5.0 }));
        assert_eq!(map.count_of(Health::component_type_id()), 1);
    }

    #[test]
    fn test_multi_instance_keeps_attach_order() {
        let mut map = ComponentMap::new();
        map.insert(Note("a")).unwrap();
        map.insert(Note("b")).unwrap();
        assert_eq!(map.get_all::<Note>(), vec![&Note("a"), &Note("b")]);
        assert_eq!(map.remove::<Note>(), Some(Note("b")));
        assert_eq!(map.get::<Note>(), Some(&Note("a")));
    }

    #[test]
    fn test_remove_last_instance_drops_slot() {
        let mut map = ComponentMap::new();
        map.insert(Health { current: 1.0, max: 1.0 }).unwrap();
        assert!(map.remove::<Health>().is_some());
        assert!(map.is_empty());
        assert!(map.remove::<Health>().is_none());
    }

    #[test]
    fn test_get_mut_updates_value() {
        let mut map = ComponentMap::new();
        map.insert(Health { current: 1.0, max: 10.0 }).unwrap();
        map.get_mut::<Health>().unwrap().current = 7.0;
        assert_eq!(map.get::<Health>().unwrap().current, 7.0);
    }

    #[test]
    fn test_slots_report_multi_flag() {
        let mut map = ComponentMap::new();
        map.insert(Health { current: 1.0, max: 1.0 }).unwrap();
        map.insert(Note("x")).unwrap();
        let slots = map.slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].name, "Health");
        assert!(!slots[0].multi);
        assert!(slots[1].multi);
    }
}
