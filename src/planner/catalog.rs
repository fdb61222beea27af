//! Set of recognized field names
//!
//! Supplied by the record store owner. When the parser is given a catalog,
//! references to fields outside it are rejected at parse time.

use std::collections::BTreeSet;

/// Recognized field names, derived fields included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCatalog {
    fields: BTreeSet<String>,
}

impl FieldCatalog {
    /// Creates a catalog from field names (lower-cased)
    pub fn new(fields: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|f| f.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Adds a field name
    pub fn insert(&mut self, field: impl AsRef<str>) {
        self.fields.insert(field.as_ref().to_lowercase());
    }

    /// Checks a canonical (lower-case) field name
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: AsRef<str>> Extend<S> for FieldCatalog {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        for field in iter {
            self.insert(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lowercases() {
        let mut catalog = FieldCatalog::new(["Name", "ROLL_NO"]);
        catalog.extend(["avg_grade"]);

        assert!(catalog.contains("name"));
        assert!(catalog.contains("roll_no"));
        assert!(catalog.contains("avg_grade"));
        assert!(!catalog.contains("email"));
        assert_eq!(catalog.len(), 3);
    }
}
