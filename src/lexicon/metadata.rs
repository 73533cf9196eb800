//! Metadata-backed lexical matching.
//!
//! Two multimaps built from dataset metadata: class → categories and
//! attribute value → attribute names. Keys are normalized at load so
//! lookups match the canonical form the tables were built with.

use std::collections::HashMap;

use crate::core::fault::Fault;

/// Canonical key form: trimmed, lowercased, whitespace runs collapsed to `_`.
pub fn normalize(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Class/value category tables.
#[derive(Debug, Clone, Default)]
pub struct MetadataLexicon {
    /// normalized class → category names it belongs to.
    class_categories: HashMap<String, Vec<String>>,
    /// normalized attribute value → attribute names it can fill.
    value_attributes: HashMap<String, Vec<String>>,
}

impl MetadataLexicon {
    /// Empty tables: equality-only matching, every pick raises
    /// incomplete-metadata.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from the dataset's forward tables (`category → [class]`,
    /// `attribute → [value]`), inverting them into lookup form.
    pub fn from_tables(
        categories: &HashMap<String, Vec<String>>,
        attributes: &HashMap<String, Vec<String>>,
    ) -> Self {
        let mut class_categories: HashMap<String, Vec<String>> = HashMap::new();
        for (category, classes) in categories {
            let category = normalize(category);
            for class in classes {
                class_categories
                    .entry(normalize(class))
                    .or_default()
                    .push(category.clone());
            }
        }

        let mut value_attributes: HashMap<String, Vec<String>> = HashMap::new();
        for (attribute, values) in attributes {
            let attribute = normalize(attribute);
            for value in values {
                value_attributes
                    .entry(normalize(value))
                    .or_default()
                    .push(attribute.clone());
            }
        }

        Self {
            class_categories,
            value_attributes,
        }
    }

    /// True when either side's declared category set contains the other.
    /// Plain equality is handled a layer up, before mode dispatch.
    pub fn equal_or_hyponym(&self, a: &str, b: &str) -> bool {
        let a = normalize(a);
        let b = normalize(b);
        let member = |x: &str, y: &str| {
            self.class_categories
                .get(x)
                .is_some_and(|cats| cats.iter().any(|c| c == y))
        };
        member(&a, &b) || member(&b, &a)
    }

    /// First value whose attribute-name set contains `category`. A value
    /// with no table entry is an incomplete-metadata fault.
    pub fn pick_attribute(
        &self,
        category: &str,
        values: &[String],
    ) -> Result<Option<String>, Fault> {
        let category = normalize(category);
        for value in values {
            let attrs = self
                .value_attributes
                .get(&normalize(value))
                .ok_or_else(|| Fault::IncompleteMetadata(value.clone()))?;
            if attrs.iter().any(|a| *a == category) {
                return Ok(Some(value.clone()));
            }
        }
        Ok(None)
    }
}
