#![forbid(unsafe_code)]

//! Section registry.
//!
//! A [`SectionRegistry`] is the ordered, immutable list of navigable page
//! regions. It is built once when the page mounts and never mutated; every
//! other component looks ids up here before acting on them.
//!
//! # Invariants
//!
//! 1. The registry holds at least one section.
//! 2. Ids are non-empty and unique.
//! 3. Insertion order is preserved and is the only iteration order.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Stable identifier of a page section (also its DOM anchor).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(Arc<str>);

impl SectionId {
    /// Create an id from any string-like value.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SectionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SectionId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&SectionId> for SectionId {
    fn from(id: &SectionId) -> Self {
        id.clone()
    }
}

impl PartialEq<str> for SectionId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for SectionId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// One navigable page region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Tracking key and DOM anchor.
    pub id: SectionId,
    /// Display name for menus.
    pub label: String,
}

impl Section {
    /// Create a section.
    #[must_use]
    pub fn new(id: impl Into<SectionId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Errors raised while building a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No sections were supplied.
    Empty,
    /// A section had an empty id.
    EmptyId {
        /// Position of the offending section.
        index: usize,
    },
    /// Two sections share an id.
    DuplicateId(SectionId),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "section registry is empty"),
            Self::EmptyId { index } => write!(f, "section at position {index} has an empty id"),
            Self::DuplicateId(id) => write!(f, "duplicate section id: {id}"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Ordered, immutable set of page sections.
#[derive(Debug, Clone)]
pub struct SectionRegistry {
    sections: Vec<Section>,
    index: HashMap<SectionId, usize>,
}

impl SectionRegistry {
    /// Build a registry, validating ids.
    pub fn new(sections: impl IntoIterator<Item = Section>) -> Result<Self, RegistryError> {
        let sections: Vec<Section> = sections.into_iter().collect();
        if sections.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut index = HashMap::with_capacity(sections.len());
        for (i, section) in sections.iter().enumerate() {
            if section.id.as_str().is_empty() {
                return Err(RegistryError::EmptyId { index: i });
            }
            if index.insert(section.id.clone(), i).is_some() {
                return Err(RegistryError::DuplicateId(section.id.clone()));
            }
        }

        crate::debug!(count = sections.len(), "section registry built");
        Ok(Self { sections, index })
    }

    /// Build a registry from bare ids, using each id as its label.
    pub fn from_ids<I, S>(ids: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(ids.into_iter().map(|id| {
            let id = id.as_ref();
            Section::new(id, id)
        }))
    }

    /// The canonical portfolio layout: hero, about, skills, projects, contact.
    #[must_use]
    pub fn portfolio() -> Self {
        let sections = vec![
            Section::new("hero", "About Me"),
            Section::new("about", "Experience"),
            Section::new("skills", "Skills"),
            Section::new("projects", "Projects"),
            Section::new("contact", "Contact"),
        ];
        let index = sections
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Self { sections, index }
    }

    /// The first (landing) section.
    #[must_use]
    pub fn first(&self) -> &Section {
        // Non-empty by construction.
        &self.sections[0]
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always `false`; registries are non-empty by construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Whether `id` names a registered section.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Look a section up by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Section> {
        self.index.get(id).map(|&i| &self.sections[i])
    }

    /// Registry position of `id`.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Section at a zero-based position.
    #[must_use]
    pub fn nth(&self, position: usize) -> Option<&Section> {
        self.sections.get(position)
    }

    /// Iterate sections in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Iterate ids in registry order.
    pub fn ids(&self) -> impl Iterator<Item = &SectionId> {
        self.sections.iter().map(|s| &s.id)
    }
}

impl<'a> IntoIterator for &'a SectionRegistry {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portfolio_order_and_labels() {
        let registry = SectionRegistry::portfolio();
        let ids: Vec<&str> = registry.ids().map(SectionId::as_str).collect();
        assert_eq!(ids, ["hero", "about", "skills", "projects", "contact"]);
        assert_eq!(registry.first().id, "hero");
        assert_eq!(registry.get("about").map(|s| s.label.as_str()), Some("Experience"));
    }

    #[test]
    fn lookups() {
        let registry = SectionRegistry::portfolio();
        assert!(registry.contains("skills"));
        assert!(!registry.contains("blog"));
        assert_eq!(registry.position("projects"), Some(3));
        assert_eq!(registry.nth(4).map(|s| s.id.as_str()), Some("contact"));
        assert!(registry.nth(5).is_none());
        assert_eq!(registry.len(), 5);
        assert!(!registry.is_empty());
    }

    #[test]
    fn empty_registry_rejected() {
        let err = SectionRegistry::new(Vec::new()).unwrap_err();
        assert_eq!(err, RegistryError::Empty);
    }

    #[test]
    fn empty_id_rejected() {
        let err = SectionRegistry::from_ids(["hero", ""]).unwrap_err();
        assert_eq!(err, RegistryError::EmptyId { index: 1 });
    }

    #[test]
    fn duplicate_id_rejected() {
        let err = SectionRegistry::from_ids(["hero", "about", "hero"]).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId(SectionId::new("hero")));
        assert_eq!(err.to_string(), "duplicate section id: hero");
    }

    #[test]
    fn from_ids_uses_id_as_label() {
        let registry = SectionRegistry::from_ids(["intro", "work"]).unwrap();
        assert_eq!(registry.first().label, "intro");
    }

    #[test]
    fn section_id_comparisons() {
        let id = SectionId::from("about".to_string());
        assert_eq!(id, "about");
        assert_eq!(id.to_string(), "about");
        assert_eq!(id.as_ref(), "about");
    }
}
