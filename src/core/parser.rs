//! Program parsing and validation.
//!
//! Raw steps split their operation field once — name plus optional
//! qualifier — and become typed steps. `parse_program` is the strict path
//! used before execution (first problem is a fault); `validate_program`
//! accumulates everything wrong for the CLI:
//! - operation must be in the instruction set
//! - dependencies must point at strictly earlier steps
//! - dependency count must match the operation's arity
//! - operation-specific argument grammar (relation triples, option pairs)

use super::fault::Fault;
use super::types::{OpCode, Qualifier, RawStep, Step};
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse one raw step into its typed form.
pub fn parse_step(raw: &RawStep) -> Result<Step, Fault> {
    let (name, qualifier) = match raw.operation.split_once(' ') {
        Some((name, rest)) => (name, Some(Qualifier::parse(rest))),
        None => (raw.operation.as_str(), None),
    };
    Ok(Step {
        op: OpCode::parse(name)?,
        qualifier,
        argument: raw.argument.clone(),
        dependencies: raw.dependencies.clone(),
    })
}

/// Parse a whole program, rejecting forward and self dependencies.
pub fn parse_program(steps: &[RawStep]) -> Result<Vec<Step>, Fault> {
    let mut parsed = Vec::with_capacity(steps.len());
    for (index, raw) in steps.iter().enumerate() {
        let step = parse_step(raw)?;
        if let Some(&bad) = step.dependencies.iter().find(|&&d| d >= index) {
            return Err(Fault::MissingDependency(bad));
        }
        parsed.push(step);
    }
    Ok(parsed)
}

/// Read a program file: a JSON array of raw steps.
pub fn parse_program_file(path: &Path) -> Result<Vec<RawStep>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("program parse error: {}", e))
}

/// Dependency count each operation expects. `same`/`different` flatten one
/// or two node sets.
fn arity(op: OpCode) -> (usize, usize) {
    match op {
        OpCode::Select => (0, 0),
        OpCode::Relate
        | OpCode::Verify
        | OpCode::Choose
        | OpCode::Filter
        | OpCode::Query
        | OpCode::Exist => (1, 1),
        OpCode::Common | OpCode::And | OpCode::Or => (2, 2),
        OpCode::Same | OpCode::Different => (1, 2),
    }
}

/// Validate a raw program. Returns a list of errors (empty = valid).
pub fn validate_program(steps: &[RawStep]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if steps.is_empty() {
        errors.push(ValidationError {
            message: "program has no steps".to_string(),
        });
    }

    for (index, raw) in steps.iter().enumerate() {
        let step = match parse_step(raw) {
            Ok(step) => step,
            Err(fault) => {
                errors.push(ValidationError {
                    message: format!("step {}: {}", index, fault),
                });
                continue;
            }
        };

        for &dep in &step.dependencies {
            if dep >= index {
                errors.push(ValidationError {
                    message: format!(
                        "step {} depends on step {} which is not earlier",
                        index, dep
                    ),
                });
            }
        }

        let (min, max) = arity(step.op);
        let n = step.dependencies.len();
        if n < min || n > max {
            errors.push(ValidationError {
                message: format!(
                    "step {} ({}) has {} dependencies, expected {}",
                    index,
                    step.op,
                    n,
                    if min == max {
                        min.to_string()
                    } else {
                        format!("{}-{}", min, max)
                    }
                ),
            });
        }

        // Argument grammar
        match step.op {
            OpCode::Relate => {
                if step.argument.split(',').count() != 3 {
                    errors.push(ValidationError {
                        message: format!(
                            "step {} (relate) argument '{}' is not a class,relation,direction triple",
                            index, step.argument
                        ),
                    });
                }
            }
            OpCode::Choose => {
                if step.qualifier == Some(Qualifier::Rel) {
                    let parts: Vec<&str> = step.argument.split(',').collect();
                    if parts.len() != 3 || parts[1].split('|').count() != 2 {
                        errors.push(ValidationError {
                            message: format!(
                                "step {} (choose rel) argument '{}' is not class,a|b,direction",
                                index, step.argument
                            ),
                        });
                    }
                } else if step.argument.is_empty() {
                    errors.push(ValidationError {
                        message: format!("step {} (choose) has no options", index),
                    });
                }
            }
            _ => {}
        }
    }

    errors
}
