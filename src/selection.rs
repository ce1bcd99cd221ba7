//! Ordered, duplicate-free set of countries chosen for comparison.

use crate::models::SelectedCountry;
use ahash::AHashSet;

/// Outcome of [`SelectionStore::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Selected,
    Deselected,
}

/// Insertion order is legend order. Uniqueness is by country code.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    countries: Vec<SelectedCountry>,
    codes: AHashSet<String>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `code` if present, otherwise append `{code, name}`.
    pub fn toggle(&mut self, code: &str, name: &str) -> Toggle {
        if self.codes.remove(code) {
            self.countries.retain(|c| c.code != code);
            Toggle::Deselected
        } else {
            self.codes.insert(code.to_string());
            self.countries.push(SelectedCountry::new(code, name));
            Toggle::Selected
        }
    }

    pub fn clear(&mut self) {
        self.countries.clear();
        self.codes.clear();
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedCountry> {
        self.countries.iter()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.countries.iter().map(|c| c.code.as_str()).collect()
    }

    pub fn as_slice(&self) -> &[SelectedCountry] {
        &self.countries
    }
}

impl PartialEq for SelectionStore {
    fn eq(&self, other: &Self) -> bool {
        self.countries == other.countries
    }
}

impl Eq for SelectionStore {}

impl<'a> IntoIterator for &'a SelectionStore {
    type Item = &'a SelectedCountry;
    type IntoIter = std::slice::Iter<'a, SelectedCountry>;

    fn into_iter(self) -> Self::IntoIter {
        self.countries.iter()
    }
}
