//! Agent tags and the tag library.
//!
//! A [`Tag`] is a single-valued grouping label. The [`TagLibrary`] holds the
//! registered tag names and an index from tag to the agents carrying it, so
//! group queries do not scan the whole population.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::error::ComponentError;

/// A numeric agent tag. [`Tag::NONE`] (0) is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag(pub u32);

impl Tag {
    /// The tag every agent carries unless told otherwise.
    pub const NONE: Tag = Tag(0);
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tag names plus the tag → agents group index.
///
/// Every tracked agent belongs to exactly one group; assigning a new tag moves
/// it out of its previous group. Group members keep assignment order.
#[derive(Debug)]
pub struct TagLibrary {
    names: Vec<String>,
    groups: HashMap<Tag, IndexSet<AgentId>>,
    memberships: HashMap<AgentId, Tag>,
}

impl Default for TagLibrary {
    fn default() -> Self {
        Self {
            names: vec!["NONE".to_owned()],
            groups: HashMap::new(),
            memberships: HashMap::new(),
        }
    }
}

impl TagLibrary {
    /// Create a library holding only [`Tag::NONE`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tag name and return its tag.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::DuplicateTag`] if the name is taken.
    pub fn add_tag(&mut self, name: impl Into<String>) -> Result<Tag, ComponentError> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(ComponentError::DuplicateTag(name));
        }
        let tag = Tag(u32::try_from(self.names.len()).unwrap_or(u32::MAX));
        self.names.push(name);
        Ok(tag)
    }

    /// Look up a tag by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Tag> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|idx| u32::try_from(idx).ok())
            .map(Tag)
    }

    /// Look up a tag by name, failing if it is not registered.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::TagNotFound`] for unknown names.
    pub fn require(&self, name: &str) -> Result<Tag, ComponentError> {
        self.get(name)
            .ok_or_else(|| ComponentError::TagNotFound(name.to_owned()))
    }

    /// Returns the registered name of a tag.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::TagNotFound`] if the tag was never registered.
    pub fn name_of(&self, tag: Tag) -> Result<&str, ComponentError> {
        self.names
            .get(tag.0 as usize)
            .map(String::as_str)
            .ok_or_else(|| ComponentError::TagNotFound(tag.to_string()))
    }

    /// Returns the number of registered tags, [`Tag::NONE`] included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always `false`: [`Tag::NONE`] is registered from the start.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Put an agent in the group for `tag`, leaving any previous group.
    ///
    /// Returns the previous tag, if the agent was tracked.
    pub fn assign(&mut self, agent: &AgentId, tag: Tag) -> Option<Tag> {
        let previous = self.unassign(agent);
        self.groups.entry(tag).or_default().insert(agent.clone());
        self.memberships.insert(agent.clone(), tag);
        previous
    }

    /// Remove an agent from whichever group holds it.
    pub fn unassign(&mut self, agent: &AgentId) -> Option<Tag> {
        let previous = self.memberships.remove(agent)?;
        if let Some(group) = self.groups.get_mut(&previous) {
            group.shift_remove(agent);
            if group.is_empty() {
                self.groups.remove(&previous);
            }
        }
        Some(previous)
    }

    /// Returns a snapshot of the agents carrying `tag`, in assignment order.
    #[must_use]
    pub fn members(&self, tag: Tag) -> Vec<AgentId> {
        self.groups
            .get(&tag)
            .map(|group| group.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if the agent is in the group for `tag`.
    #[must_use]
    pub fn is_member(&self, agent: &AgentId, tag: Tag) -> bool {
        self.memberships.get(agent) == Some(&tag)
    }

    /// Returns the tag the agent is grouped under.
    #[must_use]
    pub fn tag_of(&self, agent: &AgentId) -> Option<Tag> {
        self.memberships.get(agent).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_preregistered() {
        let lib = TagLibrary::new();
        assert_eq!(lib.get("NONE"), Some(Tag::NONE));
        assert_eq!(lib.name_of(Tag::NONE).unwrap(), "NONE");
        assert_eq!(lib.len(), 1);
    }

    #[test]
    fn test_add_tag_assigns_sequential_values() {
        let mut lib = TagLibrary::new();
        let prey = lib.add_tag("PREY").unwrap();
        let predator = lib.add_tag("PREDATOR").unwrap();
        assert_eq!(prey, Tag(1));
        assert_eq!(predator, Tag(2));
        assert_eq!(lib.name_of(predator).unwrap(), "PREDATOR");
    }

    #[test]
    fn test_duplicate_tag_name() {
        let mut lib = TagLibrary::new();
        lib.add_tag("PREY").unwrap();
        let err = lib.add_tag("PREY").unwrap_err();
        assert!(matches!(err, ComponentError::DuplicateTag(name) if name == "PREY"));
    }

    #[test]
    fn test_unknown_tag_lookups() {
        let lib = TagLibrary::new();
        assert!(lib.get("GHOST").is_none());
        assert!(matches!(lib.require("GHOST"), Err(ComponentError::TagNotFound(_))));
        assert!(lib.name_of(Tag(42)).is_err());
    }

    #[test]
    fn test_reassignment_moves_between_groups() {
        let mut lib = TagLibrary::new();
        let a = AgentId::from("a");
        let b = AgentId::from("b");
        assert_eq!(lib.assign(&a, Tag::NONE), None);
        lib.assign(&b, Tag::NONE);

        assert_eq!(lib.assign(&a, Tag(3)), Some(Tag::NONE));
        assert_eq!(lib.members(Tag::NONE), vec![b.clone()]);
        assert_eq!(lib.members(Tag(3)), vec![a.clone()]);
        assert!(lib.is_member(&a, Tag(3)));
        assert_eq!(lib.tag_of(&a), Some(Tag(3)));
    }

    #[test]
    fn test_unassign_clears_membership() {
        let mut lib = TagLibrary::new();
        let a = AgentId::from("a");
        lib.assign(&a, Tag(1));
        assert_eq!(lib.unassign(&a), Some(Tag(1)));
        assert!(lib.members(Tag(1)).is_empty());
        assert_eq!(lib.unassign(&a), None);
    }
}
