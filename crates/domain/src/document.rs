//! In-memory representation of one INI-style configuration store.
//!
//! A document is an ordered list of named sections, each holding key/value
//! pairs. Section order is preserved because it carries meaning for some
//! stores (the authentication backend chain is tried top to bottom).

use std::collections::BTreeMap;

/// One named section of a [`ConfigDocument`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSection {
    name: String,
    values: BTreeMap<String, String>,
}

impl ConfigSection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Build a section from an existing key/value map.
    #[must_use]
    pub fn with_values(name: impl Into<String>, values: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Like [`get`](Self::get) but treats empty values as absent.
    #[must_use]
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered collection of [`ConfigSection`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    sections: Vec<ConfigSection>,
}

impl ConfigDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&ConfigSection> {
        self.sections.iter().find(|section| section.name == name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut ConfigSection> {
        self.sections.iter_mut().find(|section| section.name == name)
    }

    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn sections(&self) -> impl Iterator<Item = &ConfigSection> {
        self.sections.iter()
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(ConfigSection::name)
    }

    /// Insert `section`, replacing a section of the same name in place or
    /// appending it at the end.
    pub fn set_section(&mut self, section: ConfigSection) {
        match self.position(&section.name) {
            Some(index) => self.sections[index] = section,
            None => self.sections.push(section),
        }
    }

    /// Replace the section called `old_name` with `section`, keeping its
    /// position. Appends when `old_name` does not exist.
    pub fn replace_section(&mut self, old_name: &str, section: ConfigSection) {
        match self.position(old_name) {
            Some(index) => self.sections[index] = section,
            None => self.sections.push(section),
        }
    }

    pub fn remove_section(&mut self, name: &str) -> Option<ConfigSection> {
        self.position(name)
            .map(|index| self.sections.remove(index))
    }

    /// Move the section called `name` to `index` (clamped to the end).
    /// Returns `false` when no such section exists.
    pub fn move_section(&mut self, name: &str, index: usize) -> bool {
        let Some(current) = self.position(name) else {
            return false;
        };
        let section = self.sections.remove(current);
        let index = index.min(self.sections.len());
        self.sections.insert(index, section);
        true
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.name == name)
    }

    /// Read `key` from `section`.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Write `key` in `section`, creating the section when needed.
    pub fn set(&mut self, section: &str, key: impl Into<String>, value: impl Into<String>) {
        if let Some(existing) = self.section_mut(section) {
            existing.set(key, value);
        } else {
            let mut created = ConfigSection::new(section);
            created.set(key, value);
            self.sections.push(created);
        }
    }

    /// Remove `key` from `section`; drops the section once it is empty.
    pub fn unset(&mut self, section: &str, key: &str) {
        if let Some(existing) = self.section_mut(section) {
            existing.remove(key);
            if existing.is_empty() {
                self.remove_section(section);
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl FromIterator<ConfigSection> for ConfigDocument {
    fn from_iter<I: IntoIterator<Item = ConfigSection>>(iter: I) -> Self {
        let mut doc = Self::new();
        for section in iter {
            doc.set_section(section);
        }
        doc
    }
}
