//! Lexical matching — "is A a kind of B", "which of these values is a color".
//!
//! Two interchangeable modes behind one enum: `Metadata` answers from
//! dataset category tables, `Taxonomy` from a word-sense hypernym graph.
//! Both are plain immutable tables, so distinct configurations can coexist
//! (and be shared across threads) freely.

pub mod metadata;
pub mod taxonomy;

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::fault::Fault;
pub use metadata::MetadataLexicon;
pub use taxonomy::{Taxonomy, TaxonomyLexicon};

/// Matches any class or attribute.
pub const WILDCARD: &str = "_";

/// The categories an attribute set is tried against, in order.
pub const KNOWN_CATEGORIES: [&str; 3] = ["color", "material", "shape"];

/// A resolver in one of its two modes.
#[derive(Debug, Clone)]
pub enum Lexicon {
    Metadata(MetadataLexicon),
    Taxonomy(TaxonomyLexicon),
}

impl Default for Lexicon {
    /// Exact-match-only resolver (empty metadata tables).
    fn default() -> Self {
        Self::Metadata(MetadataLexicon::empty())
    }
}

impl Lexicon {
    /// True if `a == b`, either side is the wildcard `_`, or the active
    /// mode relates the two words.
    pub fn equal_or_hyponym(&self, a: &str, b: &str) -> bool {
        if a == b || a == WILDCARD || b == WILDCARD {
            return true;
        }
        match self {
            Self::Metadata(m) => m.equal_or_hyponym(a, b),
            Self::Taxonomy(t) => t.equal_or_hyponym(a, b),
        }
    }

    /// The member of `values` that fits `category`, if any.
    pub fn pick_attribute(
        &self,
        category: &str,
        values: &[String],
    ) -> Result<Option<String>, Fault> {
        match self {
            Self::Metadata(m) => m.pick_attribute(category, values),
            Self::Taxonomy(t) => t.pick_attribute(category, values),
        }
    }

    /// Which of the fixed known categories an attribute set belongs to.
    /// Valid data always matches one; no match is a defect signal.
    pub fn category(&self, values: &[String]) -> Result<&'static str, Fault> {
        for category in KNOWN_CATEGORIES {
            if self.pick_attribute(category, values)?.is_some() {
                return Ok(category);
            }
        }
        Err(Fault::NoCategory)
    }
}

// ============================================================================
// Config + table loading
// ============================================================================

/// Lexicon configuration file (YAML). Paths are resolved relative to the
/// config file's directory.
#[derive(Debug, Clone, Deserialize)]
pub struct LexiconConfig {
    pub mode: LexiconMode,

    /// Metadata mode: `category → [class]` JSON table.
    #[serde(default)]
    pub class_categories: Option<PathBuf>,
    /// Metadata mode: `attribute → [value]` JSON table.
    #[serde(default)]
    pub attribute_values: Option<PathBuf>,

    /// Taxonomy mode: `sense → [hypernym sense]` JSON table.
    #[serde(default)]
    pub hypernyms: Option<PathBuf>,
    /// Taxonomy mode: `word → sense` JSON table for object classes.
    #[serde(default)]
    pub object_senses: Option<PathBuf>,
    /// Taxonomy mode: `word → sense` JSON table for attribute values.
    #[serde(default)]
    pub attribute_senses: Option<PathBuf>,
    /// Taxonomy mode: `sense → sense` substitutions; omitted → built-in list.
    #[serde(default)]
    pub sense_overrides: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LexiconMode {
    Metadata,
    Taxonomy,
}

fn load_json<T: serde::de::DeserializeOwned>(base: &Path, path: &Path) -> Result<T, String> {
    let full = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    let content = std::fs::read_to_string(&full)
        .map_err(|e| format!("cannot read {}: {}", full.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("invalid table {}: {}", full.display(), e))
}

impl Lexicon {
    /// Load a lexicon from a YAML config file.
    pub fn load(config_path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("cannot read {}: {}", config_path.display(), e))?;
        let config: LexiconConfig = serde_yaml_ng::from_str(&content)
            .map_err(|e| format!("invalid lexicon config {}: {}", config_path.display(), e))?;
        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Self::from_config(&config, &base)
    }

    /// Build from an already-parsed config, resolving paths against `base`.
    pub fn from_config(config: &LexiconConfig, base: &Path) -> Result<Self, String> {
        match config.mode {
            LexiconMode::Metadata => {
                let categories: HashMap<String, Vec<String>> = match &config.class_categories {
                    Some(p) => load_json(base, p)?,
                    None => HashMap::new(),
                };
                let attributes: HashMap<String, Vec<String>> = match &config.attribute_values {
                    Some(p) => load_json(base, p)?,
                    None => HashMap::new(),
                };
                Ok(Self::Metadata(MetadataLexicon::from_tables(
                    &categories,
                    &attributes,
                )))
            }
            LexiconMode::Taxonomy => {
                let hypernyms: HashMap<String, Vec<String>> = match &config.hypernyms {
                    Some(p) => load_json(base, p)?,
                    None => return Err("taxonomy mode needs a hypernyms table".to_string()),
                };
                let mut taxonomy = Taxonomy::new(hypernyms);
                if let Some(p) = &config.sense_overrides {
                    let overrides: HashMap<String, String> = load_json(base, p)?;
                    taxonomy = taxonomy.with_overrides(overrides);
                }
                let object_senses: HashMap<String, String> = match &config.object_senses {
                    Some(p) => load_json(base, p)?,
                    None => HashMap::new(),
                };
                let attribute_senses: HashMap<String, String> = match &config.attribute_senses {
                    Some(p) => load_json(base, p)?,
                    None => HashMap::new(),
                };
                Ok(Self::Taxonomy(TaxonomyLexicon::new(
                    taxonomy,
                    object_senses,
                    attribute_senses,
                )))
            }
        }
    }
}
