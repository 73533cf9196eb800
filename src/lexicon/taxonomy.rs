//! Taxonomy-backed lexical matching.
//!
//! A word sense is an identifier like `truck.n.01` (lemma, part of speech,
//! sense number). The taxonomy holds each sense's direct hypernyms;
//! descendant tests walk the transitive closure. Object classes and
//! attribute values map to senses through two word → sense tables, with a
//! small override list for senses whose default mapping is the wrong one
//! for scene descriptions.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::fault::Fault;

/// Senses whose default resolution points at the wrong meaning for scene
/// text (e.g. `white.n.01` is a person's name; the color is `white.n.02`).
pub const DEFAULT_SENSE_OVERRIDES: [(&str, &str); 4] = [
    ("white.n.01", "white.n.02"),
    ("grey.n.01", "grey.n.05"),
    ("dark.n.01", "black.n.01"),
    ("size.n.01", "size.n.02"),
];

// ============================================================================
// Sense graph
// ============================================================================

/// The hypernym graph over senses.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    /// sense → direct hypernym senses.
    hypernyms: HashMap<String, Vec<String>>,
    /// lemma → senses carrying it, in insertion order.
    lemma_index: HashMap<String, Vec<String>>,
    /// sense → substitute sense.
    overrides: HashMap<String, String>,
}

fn lemma_of(sense: &str) -> &str {
    sense.split('.').next().unwrap_or(sense)
}

impl Taxonomy {
    /// Build from a sense → hypernyms table. Senses appearing only on the
    /// hypernym side get an empty entry so existence checks see them. The
    /// default sense overrides are installed; `with_overrides` replaces
    /// them.
    pub fn new(hypernyms: HashMap<String, Vec<String>>) -> Self {
        let mut full = hypernyms;
        let referenced: Vec<String> = full
            .values()
            .flatten()
            .filter(|s| !full.contains_key(*s))
            .cloned()
            .collect();
        for sense in referenced {
            full.entry(sense).or_default();
        }

        let mut lemma_index: HashMap<String, Vec<String>> = HashMap::new();
        for sense in full.keys() {
            lemma_index
                .entry(lemma_of(sense).to_string())
                .or_default()
                .push(sense.clone());
        }
        for senses in lemma_index.values_mut() {
            senses.sort();
        }

        Self {
            hypernyms: full,
            lemma_index,
            overrides: DEFAULT_SENSE_OVERRIDES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    pub fn with_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn contains(&self, sense: &str) -> bool {
        self.hypernyms.contains_key(sense)
    }

    /// Apply the override table, then require the sense to exist.
    pub fn resolve(&self, sense: &str) -> Result<&str, Fault> {
        let target = self
            .overrides
            .get(sense)
            .map(String::as_str)
            .unwrap_or(sense);
        self.hypernyms
            .get_key_value(target)
            .map(|(k, _)| k.as_str())
            .ok_or_else(|| Fault::NotInTaxonomy(sense.to_string()))
    }

    /// True iff `a == b` or `b` lies in `a`'s transitive hypernym closure.
    pub fn is_descendant(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(a);
        while let Some(sense) = queue.pop_front() {
            if let Some(parents) = self.hypernyms.get(sense) {
                for parent in parents {
                    if parent == b {
                        return true;
                    }
                    if seen.insert(parent) {
                        queue.push_back(parent);
                    }
                }
            }
        }
        false
    }

    /// Recast an adjective-like sense as its noun reading: lemma + `.n.01`,
    /// overrides applied. When the noun sense is unknown the original sense
    /// is kept.
    pub fn nounify<'a>(&'a self, sense: &'a str) -> &'a str {
        let candidate = format!("{}.n.01", lemma_of(sense));
        match self.resolve(&candidate) {
            Ok(resolved) => resolved,
            Err(_) => sense,
        }
    }

    /// First sense of a lemma, for words outside the sense tables.
    pub fn first_sense(&self, lemma: &str) -> Option<&str> {
        self.lemma_index
            .get(lemma)
            .and_then(|senses| senses.first())
            .map(String::as_str)
    }
}

// ============================================================================
// Resolver over the sense graph
// ============================================================================

/// Taxonomy tables plus the word → sense maps for classes and attributes.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyLexicon {
    taxonomy: Taxonomy,
    object_senses: HashMap<String, String>,
    attribute_senses: HashMap<String, String>,
}

impl TaxonomyLexicon {
    pub fn new(
        taxonomy: Taxonomy,
        object_senses: HashMap<String, String>,
        attribute_senses: HashMap<String, String>,
    ) -> Self {
        Self {
            taxonomy,
            object_senses,
            attribute_senses,
        }
    }

    /// True when one word's sense is a taxonomic descendant of the other's.
    /// Words without an object sense never match (not a fault — the word
    /// simply isn't in the vocabulary).
    pub fn equal_or_hyponym(&self, a: &str, b: &str) -> bool {
        let (Some(sa), Some(sb)) = (self.object_senses.get(a), self.object_senses.get(b)) else {
            return false;
        };
        self.taxonomy.is_descendant(sa, sb) || self.taxonomy.is_descendant(sb, sa)
    }

    /// The member of `values` whose nounified sense descends from the
    /// category's sense. Values without an attribute sense are skipped;
    /// a category that resolves to no sense at all is a taxonomy fault.
    pub fn pick_attribute(
        &self,
        category: &str,
        values: &[String],
    ) -> Result<Option<String>, Fault> {
        let category_sense = match self.object_senses.get(category) {
            Some(sense) => self.taxonomy.resolve(sense)?,
            None => self
                .taxonomy
                .first_sense(category)
                .ok_or_else(|| Fault::NotInTaxonomy(category.to_string()))?,
        };

        for value in values {
            let Some(sense) = self.attribute_senses.get(value) else {
                continue;
            };
            let nounified = self.taxonomy.nounify(sense);
            if self.taxonomy.is_descendant(nounified, category_sense) {
                return Ok(Some(value.clone()));
            }
        }
        Ok(None)
    }
}
