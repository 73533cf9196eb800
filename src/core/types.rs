//! Program, value and outcome types.
//!
//! A question arrives as an ordered list of raw steps (the GQA `semantic`
//! form). Raw steps are parsed once into typed steps — operation tag plus
//! optional qualifier — so nothing re-splits strings during execution.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::fault::Fault;

// ============================================================================
// Raw program steps
// ============================================================================

/// One step as it appears in a question file: operation name (with an
/// optional space-separated qualifier), an operation-specific argument
/// string, and positional indices of earlier steps this one consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStep {
    pub operation: String,

    #[serde(default)]
    pub argument: String,

    #[serde(default)]
    pub dependencies: Vec<usize>,
}

impl RawStep {
    /// Convenience constructor used throughout the tests.
    pub fn new(operation: &str, argument: &str, dependencies: &[usize]) -> Self {
        Self {
            operation: operation.to_string(),
            argument: argument.to_string(),
            dependencies: dependencies.to_vec(),
        }
    }
}

// ============================================================================
// Operation tags and qualifiers
// ============================================================================

/// The closed instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Select,
    Relate,
    Common,
    Verify,
    Choose,
    Filter,
    Query,
    Same,
    Different,
    And,
    Or,
    Exist,
}

impl OpCode {
    pub fn parse(name: &str) -> Result<Self, Fault> {
        match name {
            "select" => Ok(Self::Select),
            "relate" => Ok(Self::Relate),
            "common" => Ok(Self::Common),
            "verify" => Ok(Self::Verify),
            "choose" => Ok(Self::Choose),
            "filter" => Ok(Self::Filter),
            "query" => Ok(Self::Query),
            "same" => Ok(Self::Same),
            "different" => Ok(Self::Different),
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            "exist" => Ok(Self::Exist),
            other => Err(Fault::UnknownOperation(other.to_string())),
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Select => "select",
            Self::Relate => "relate",
            Self::Common => "common",
            Self::Verify => "verify",
            Self::Choose => "choose",
            Self::Filter => "filter",
            Self::Query => "query",
            Self::Same => "same",
            Self::Different => "different",
            Self::And => "and",
            Self::Or => "or",
            Self::Exist => "exist",
        };
        write!(f, "{}", name)
    }
}

/// Auxiliary attributes read straight off a node, bypassing category lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aux {
    Name,
    Weather,
    Location,
    HPosition,
    VPosition,
}

impl Aux {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "weather" => Some(Self::Weather),
            "location" => Some(Self::Location),
            "hposition" => Some(Self::HPosition),
            "vposition" => Some(Self::VPosition),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Weather => "weather",
            Self::Location => "location",
            Self::HPosition => "hposition",
            Self::VPosition => "vposition",
        }
    }
}

/// Optional second token of an operation name, narrowing its behavior
/// (`verify rel`, `filter hposition`, `same color`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    /// Delegate to relation matching.
    Rel,
    /// One of the auxiliary node fields.
    Aux(Aux),
    /// An attribute category resolved through the lexicon.
    Category(String),
}

impl Qualifier {
    pub fn parse(s: &str) -> Self {
        if s == "rel" {
            Self::Rel
        } else if let Some(aux) = Aux::parse(s) {
            Self::Aux(aux)
        } else {
            Self::Category(s.to_string())
        }
    }

    /// The qualifier as the category string handed to attribute picking.
    pub fn category_str(&self) -> &str {
        match self {
            Self::Rel => "rel",
            Self::Aux(aux) => aux.as_str(),
            Self::Category(s) => s,
        }
    }
}

/// A fully parsed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub op: OpCode,
    pub qualifier: Option<Qualifier>,
    pub argument: String,
    pub dependencies: Vec<usize>,
}

// ============================================================================
// Result values
// ============================================================================

/// Intermediate result of a step. Recursive: querying `weather` of a
/// non-scene node yields that node's whole attribute list as one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A set of node identifiers (duplicates possible, order preserved).
    Objects(Vec<String>),
    Bool(bool),
    Str(String),
    Null,
    List(Vec<Value>),
}

impl Value {
    /// Name of the variant, for type-mismatch diagnostics.
    pub fn variant(&self) -> &'static str {
        match self {
            Value::Objects(_) => "node set",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Null => "null",
            Value::List(_) => "list",
        }
    }

    /// Coerce to a node set or report what was found instead.
    pub fn as_objects(&self) -> Result<&[String], Fault> {
        match self {
            Value::Objects(ids) => Ok(ids),
            other => Err(Fault::TypeMismatch {
                expected: "node set",
                found: other.variant(),
            }),
        }
    }

    /// Truthiness used by `and`/`or`: non-empty collections, true booleans
    /// and any string count as true.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Objects(ids) => !ids.is_empty(),
            Value::Bool(b) => *b,
            Value::Str(_) => true,
            Value::Null => false,
            Value::List(items) => !items.is_empty(),
        }
    }

    /// Wrap an optional scalar, mapping absence to `Null`.
    pub fn from_opt(value: Option<String>) -> Self {
        match value {
            Some(s) => Value::Str(s),
            None => Value::Null,
        }
    }
}

// ============================================================================
// Run outcomes
// ============================================================================

/// Terminal state of one program run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Skipped,
    KnownError,
    UnknownError,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Skipped => write!(f, "skipped"),
            Self::KnownError => write!(f, "known_error"),
            Self::UnknownError => write!(f, "unknown_error"),
        }
    }
}

/// What one program run reports back to the harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: RunStatus,

    /// Populated only on success. A program can succeed with no answer
    /// (choose with no matching option).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    /// Fault kind, populated only on the two error statuses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl Outcome {
    pub fn success(answer: Option<String>) -> Self {
        Self {
            status: RunStatus::Success,
            answer,
            fault: None,
        }
    }

    pub fn skipped() -> Self {
        Self {
            status: RunStatus::Skipped,
            answer: None,
            fault: None,
        }
    }

    pub fn from_fault(fault: &Fault) -> Self {
        if *fault == Fault::UnsupportedQuery {
            return Self::skipped();
        }
        let status = if fault.is_known() {
            RunStatus::KnownError
        } else {
            RunStatus::UnknownError
        };
        Self {
            status,
            answer: None,
            fault: Some(fault.kind().to_string()),
        }
    }
}
