//! Program execution.
//!
//! One interpreter per question: parse the steps, execute them strictly in
//! index order against a results table, canonicalize the last result. Every
//! fault crosses exactly one boundary — `run` — where it is classified into
//! the terminal status. No retries, no alternate plans: the first fault at
//! step *i* ends the run.

use std::collections::HashSet;
use tracing::debug;

use super::fault::Fault;
use super::ops::{self, OpCtx};
use super::parser;
use super::types::{Outcome, RawStep, Value};
use crate::lexicon::Lexicon;
use crate::scene::SceneGraph;

/// Executes programs against one scene graph with one lexicon. Both are
/// borrowed read-only, so interpreters are cheap and can run on as many
/// threads as there are questions.
pub struct Interpreter<'a> {
    graph: &'a SceneGraph,
    lexicon: &'a Lexicon,
}

impl<'a> Interpreter<'a> {
    pub fn new(graph: &'a SceneGraph, lexicon: &'a Lexicon) -> Self {
        Self { graph, lexicon }
    }

    /// Run a program to its terminal state.
    pub fn run(&self, steps: &[RawStep]) -> Outcome {
        match self.execute(steps) {
            Ok(answer) => Outcome::success(answer),
            Err(fault) => {
                debug!(kind = fault.kind(), known = fault.is_known(), "run faulted");
                Outcome::from_fault(&fault)
            }
        }
    }

    fn execute(&self, steps: &[RawStep]) -> Result<Option<String>, Fault> {
        let program = parser::parse_program(steps)?;
        let ctx = OpCtx {
            graph: self.graph,
            lexicon: self.lexicon,
        };

        let mut results: Vec<Value> = Vec::with_capacity(program.len());
        for (index, step) in program.iter().enumerate() {
            // Indices point strictly backwards; parse_program enforced that.
            let deps: Vec<&Value> = step.dependencies.iter().map(|&i| &results[i]).collect();
            debug!(step = index, op = %step.op, argument = %step.argument, "executing");
            results.push(ops::apply(step, &deps, &ctx)?);
        }

        match results.last() {
            Some(value) => sanitize_answer(value),
            None => Err(Fault::EmptyAnswer),
        }
    }
}

// ============================================================================
// Canonicalization
// ============================================================================

/// Normalize a final result into the answer value compared against ground
/// truth. Booleans become yes/no; a list must collapse to a single distinct
/// value; spatial phrasings reduce to their direction word. Idempotent on
/// already-canonical values.
pub fn sanitize_answer(value: &Value) -> Result<Option<String>, Fault> {
    match value {
        Value::Bool(b) => Ok(Some(if *b { "yes" } else { "no" }.to_string())),
        Value::Null => Ok(None),
        Value::Str(s) => Ok(Some(canonical_str(s))),
        Value::Objects(ids) => collapse(ids.iter().map(|id| Ok(Some(canonical_str(id))))),
        Value::List(items) => collapse(items.iter().map(sanitize_answer)),
    }
}

fn canonical_str(s: &str) -> String {
    if let Some(rest) = s.strip_prefix("to the ") {
        return rest.split_whitespace().next().unwrap_or(rest).to_string();
    }
    if s == "in front of" {
        return "front".to_string();
    }
    s.to_string()
}

/// Reduce canonicalized elements to the single distinct value they share.
fn collapse(
    items: impl Iterator<Item = Result<Option<String>, Fault>>,
) -> Result<Option<String>, Fault> {
    let mut first: Option<Option<String>> = None;
    let mut distinct: HashSet<Option<String>> = HashSet::new();
    for item in items {
        let value = item?;
        if first.is_none() {
            first = Some(value.clone());
        }
        distinct.insert(value);
    }
    if distinct.len() > 1 {
        return Err(Fault::AmbiguousAnswer);
    }
    first.ok_or(Fault::EmptyAnswer)
}
