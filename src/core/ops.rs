//! The operation set.
//!
//! Every operation is a pure function of (argument, dependency values,
//! qualifier, scene graph, lexicon) dispatched through one closed match —
//! adding an operation never touches the interpreter loop. Arity and
//! argument grammar are operation-local.
//!
//! Fail-fast wiring: `query` raises when no node yields a value; `relate`
//! raises a missing-edge fault only when invoked for the second option of
//! `choose rel`.

use std::collections::HashSet;

use super::fault::Fault;
use super::types::{Aux, OpCode, Qualifier, Step, Value};
use crate::lexicon::Lexicon;
use crate::scene::{Field, SceneGraph, SCENE_NODE};

/// Shared read-only state every operation sees.
pub struct OpCtx<'a> {
    pub graph: &'a SceneGraph,
    pub lexicon: &'a Lexicon,
}

/// Execute one step against its resolved dependencies.
pub fn apply(step: &Step, deps: &[&Value], ctx: &OpCtx) -> Result<Value, Fault> {
    match step.op {
        OpCode::Select => op_select(step, ctx),
        OpCode::Relate => op_relate(&step.argument, dep(deps, 0)?.as_objects()?, ctx, false),
        OpCode::Common => op_common(deps, ctx),
        OpCode::Verify => op_verify(step, deps, ctx),
        OpCode::Choose => op_choose(step, deps, ctx),
        OpCode::Filter => op_filter(step, deps, ctx),
        OpCode::Query => op_query(step, deps, ctx),
        OpCode::Same => Ok(Value::Bool(same_flag(step, deps, ctx)?)),
        OpCode::Different => Ok(Value::Bool(!same_flag(step, deps, ctx)?)),
        OpCode::And => Ok(Value::Bool(
            dep(deps, 0)?.truthy() && dep(deps, 1)?.truthy(),
        )),
        OpCode::Or => Ok(Value::Bool(
            dep(deps, 0)?.truthy() || dep(deps, 1)?.truthy(),
        )),
        OpCode::Exist => op_exist(deps),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn dep<'v>(deps: &[&'v Value], index: usize) -> Result<&'v Value, Fault> {
    deps.get(index)
        .copied()
        .ok_or(Fault::MissingDependency(index))
}

/// Attribute list of the dependency's one node. An empty set has no
/// attributes; several nodes cannot act as a single attribute carrier.
fn single_attributes<'a>(ctx: &OpCtx<'a>, ids: &[String]) -> Result<&'a [String], Fault> {
    match ids {
        [] => Ok(&[]),
        [one] => ctx.graph.attributes(one),
        _ => Err(Fault::ManyAttrCandidates),
    }
}

/// The field verify/choose test against: an auxiliary qualifier selects
/// that node field, anything else means the attribute list.
fn select_field<'a>(
    graph: &'a SceneGraph,
    id: &str,
    qualifier: Option<&Qualifier>,
) -> Result<Field<'a>, Fault> {
    match qualifier {
        Some(Qualifier::Aux(aux)) => graph.field(id, *aux),
        _ => graph.attributes(id).map(Field::Values),
    }
}

fn parse_triple(argument: &str) -> Result<(&str, &str, &str), Fault> {
    let parts: Vec<&str> = argument.split(',').collect();
    match parts[..] {
        [class, relation, direction] => Ok((class, relation, direction)),
        _ => Err(Fault::MalformedArgument(format!(
            "'{}' is not a class,relation,direction triple",
            argument
        ))),
    }
}

// ============================================================================
// Operations
// ============================================================================

fn op_select(step: &Step, ctx: &OpCtx) -> Result<Value, Fault> {
    if step.argument == SCENE_NODE {
        return Ok(Value::Objects(vec![SCENE_NODE.to_string()]));
    }
    // Arguments sometimes carry a trailing " (…)" annotation.
    let class = step
        .argument
        .split(" (")
        .next()
        .unwrap_or(step.argument.as_str());

    let mut ids = Vec::new();
    for id in ctx.graph.node_ids() {
        if let Some(node) = ctx.graph.node(id) {
            if ctx.lexicon.equal_or_hyponym(&node.name, class) {
                ids.push(id.to_string());
            }
        }
    }
    Ok(Value::Objects(ids))
}

/// Relation traversal. `direction` selects the incidence side by its first
/// character: `o` outgoing, `s` incoming, `_` both. A relation of the form
/// `same <category>` matches nodes sharing the source's picked attribute in
/// that category instead of an edge label.
fn op_relate(
    argument: &str,
    source: &[String],
    ctx: &OpCtx,
    fail_fast: bool,
) -> Result<Value, Fault> {
    let (class, relation, direction) = parse_triple(argument)?;
    let same_category = relation.strip_prefix("same ");

    let matches = |candidate: &str, edge_name: &str| -> Result<bool, Fault> {
        let node = ctx
            .graph
            .node(candidate)
            .ok_or_else(|| Fault::UnknownNode(candidate.to_string()))?;
        if !ctx.lexicon.equal_or_hyponym(&node.name, class) {
            return Ok(false);
        }
        match same_category {
            Some(category) => {
                let source_attrs = single_attributes(ctx, source)?;
                let source_pick = ctx.lexicon.pick_attribute(category, source_attrs)?;
                let candidate_pick = ctx.lexicon.pick_attribute(category, &node.attributes)?;
                Ok(source_pick == candidate_pick)
            }
            None => Ok(edge_name == relation),
        }
    };

    let first = direction.chars().next().unwrap_or(' ');
    let mut results = Vec::new();
    if matches!(first, 'o' | '_') {
        for id in source {
            for edge in ctx.graph.out_edges(id) {
                if matches(&edge.to, &edge.name)? {
                    results.push(edge.to.clone());
                }
            }
        }
    }
    if matches!(first, 's' | '_') {
        for id in source {
            for edge in ctx.graph.in_edges(id) {
                if matches(&edge.from, &edge.name)? {
                    results.push(edge.from.clone());
                }
            }
        }
    }

    if fail_fast && results.is_empty() {
        return Err(Fault::MissingEdge);
    }
    Ok(Value::Objects(results))
}

/// Category shared by both dependents' attributes.
fn op_common(deps: &[&Value], ctx: &OpCtx) -> Result<Value, Fault> {
    let a = single_attributes(ctx, dep(deps, 0)?.as_objects()?)?;
    let b = single_attributes(ctx, dep(deps, 1)?.as_objects()?)?;
    let shared: Vec<String> = a.iter().filter(|x| b.contains(x)).cloned().collect();
    let category = ctx.lexicon.category(&shared)?;
    Ok(Value::Str(category.to_string()))
}

fn op_verify(step: &Step, deps: &[&Value], ctx: &OpCtx) -> Result<Value, Fault> {
    let ids = dep(deps, 0)?.as_objects()?;

    if step.qualifier == Some(Qualifier::Rel) {
        let related = op_relate(&step.argument, ids, ctx, false)?;
        return Ok(Value::Bool(related.truthy()));
    }

    if ids.len() > 1 {
        return Err(Fault::AmbiguousAnswer);
    }
    let Some(id) = ids.first() else {
        return Ok(Value::Bool(false));
    };
    let field = select_field(ctx.graph, id, step.qualifier.as_ref())?;
    Ok(Value::Bool(field.contains(step.argument.trim())))
}

fn op_choose(step: &Step, deps: &[&Value], ctx: &OpCtx) -> Result<Value, Fault> {
    if step.argument.is_empty() {
        return Err(Fault::EmptyChoice);
    }
    let ids = dep(deps, 0)?.as_objects()?;

    if step.qualifier == Some(Qualifier::Rel) {
        let (class, options, direction) = parse_triple(&step.argument)?;
        let (a, b) = options.split_once('|').ok_or_else(|| {
            Fault::MalformedArgument(format!("'{}' is not an option pair", options))
        })?;
        let first = op_relate(&format!("{},{},{}", class, a, direction), ids, ctx, false)?;
        if first.truthy() {
            return Ok(Value::Str(a.to_string()));
        }
        // Option b must be present; an empty traversal raises here.
        op_relate(&format!("{},{},{}", class, b, direction), ids, ctx, true)?;
        return Ok(Value::Str(b.to_string()));
    }

    let id = match ids {
        [] => return Ok(Value::Null),
        [one] => one,
        _ => return Err(Fault::ManyAttrCandidates),
    };
    let field = select_field(ctx.graph, id, step.qualifier.as_ref())?;
    for option in step.argument.split('|') {
        if field.contains(option) {
            return Ok(Value::Str(option.to_string()));
        }
    }
    Ok(Value::Null)
}

fn op_filter(step: &Step, deps: &[&Value], ctx: &OpCtx) -> Result<Value, Fault> {
    let ids = dep(deps, 0)?.as_objects()?;

    let (negated, needle) = match step.argument.strip_prefix("not(") {
        Some(inner) => (true, inner.strip_suffix(')').unwrap_or(inner)),
        None => (false, step.argument.as_str()),
    };
    let position = match step.qualifier {
        Some(Qualifier::Aux(aux @ (Aux::HPosition | Aux::VPosition))) => Some(aux),
        _ => None,
    };

    let mut kept = Vec::new();
    for id in ids {
        let field = match position {
            Some(aux) => ctx.graph.field(id, aux)?,
            None => Field::Values(ctx.graph.attributes(id)?),
        };
        if field.contains(needle) != negated {
            kept.push(id.clone());
        }
    }
    Ok(Value::Objects(kept))
}

fn op_query(step: &Step, deps: &[&Value], ctx: &OpCtx) -> Result<Value, Fault> {
    // The scene graph carries no place attribute; a known dataset limit.
    if step.argument == "place" {
        return Err(Fault::UnsupportedQuery);
    }
    let ids = dep(deps, 0)?.as_objects()?;

    let mut results = Vec::new();
    if let Some(aux) = Aux::parse(&step.argument) {
        for id in ids {
            results.push(match ctx.graph.field(id, aux)? {
                Field::Scalar(Some(v)) => Value::Str(v.to_string()),
                Field::Scalar(None) => Value::Null,
                Field::Values(vs) => {
                    Value::List(vs.iter().map(|v| Value::Str(v.clone())).collect())
                }
            });
        }
    } else {
        for id in ids {
            let picked = ctx
                .lexicon
                .pick_attribute(&step.argument, ctx.graph.attributes(id)?)?;
            results.push(Value::from_opt(picked));
        }
    }

    if results.iter().all(|v| matches!(v, Value::Null)) {
        return Err(Fault::EmptyQuery);
    }
    Ok(Value::List(results))
}

/// Shared core of `same`/`different`: all dependency node sets flattened
/// into one candidate list; true iff exactly one distinct value.
fn same_flag(step: &Step, deps: &[&Value], ctx: &OpCtx) -> Result<bool, Fault> {
    let mut candidates: Vec<&String> = Vec::new();
    for value in deps {
        candidates.extend(value.as_objects()?.iter());
    }

    let mut distinct: HashSet<Option<String>> = HashSet::new();
    match &step.qualifier {
        Some(qualifier) => {
            let category = qualifier.category_str();
            for id in &candidates {
                let attrs = ctx.graph.attributes(id)?;
                distinct.insert(ctx.lexicon.pick_attribute(category, attrs)?);
            }
        }
        None => {
            if step.argument != "name" && step.argument != "type" {
                return Err(Fault::UnsupportedCategory(step.argument.clone()));
            }
            for id in &candidates {
                distinct.insert(Some(ctx.graph.name(id)?.to_string()));
            }
        }
    }
    Ok(distinct.len() == 1)
}

fn op_exist(deps: &[&Value]) -> Result<Value, Fault> {
    match dep(deps, 0)? {
        Value::Objects(ids) => Ok(Value::Bool(!ids.is_empty())),
        Value::List(items) => Ok(Value::Bool(!items.is_empty())),
        other => Err(Fault::TypeMismatch {
            expected: "node set",
            found: other.variant(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::parse_step;
    use crate::core::types::RawStep;
    use crate::lexicon::MetadataLexicon;
    use std::collections::HashMap;

    fn graph() -> SceneGraph {
        SceneGraph::from_json(
            r#"{
                "width": 300, "height": 300, "weather": "rainy",
                "objects": {
                    "1": {
                        "name": "truck",
                        "x": 10, "y": 120, "w": 80, "h": 60,
                        "attributes": ["red", "large"],
                        "relations": [
                            {"name": "of", "object": "2"},
                            {"name": "near", "object": "3"}
                        ]
                    },
                    "2": {
                        "name": "tire",
                        "x": 240, "y": 250, "w": 30, "h": 30,
                        "attributes": ["black", "round"],
                        "relations": []
                    },
                    "3": {
                        "name": "car",
                        "x": 150, "y": 130, "w": 60, "h": 40,
                        "attributes": ["red", "small"],
                        "relations": [{"name": "of", "object": "2"}]
                    }
                }
            }"#,
        )
        .unwrap()
    }

    fn lexicon() -> Lexicon {
        let categories = HashMap::from([(
            "vehicle".to_string(),
            vec!["truck".to_string(), "car".to_string()],
        )]);
        let attributes = HashMap::from([
            (
                "color".to_string(),
                vec!["red".to_string(), "black".to_string()],
            ),
            (
                "size".to_string(),
                vec!["large".to_string(), "small".to_string()],
            ),
            ("shape".to_string(), vec!["round".to_string()]),
        ]);
        Lexicon::Metadata(MetadataLexicon::from_tables(&categories, &attributes))
    }

    fn run(op: &str, argument: &str, deps: &[&Value], graph: &SceneGraph, lex: &Lexicon) -> Result<Value, Fault> {
        let step = parse_step(&RawStep::new(op, argument, &[])).unwrap();
        apply(&step, deps, &OpCtx { graph, lexicon: lex })
    }

    #[test]
    fn test_select_scene() {
        let (g, l) = (graph(), lexicon());
        let v = run("select", "scene", &[], &g, &l).unwrap();
        assert_eq!(v, Value::Objects(vec!["scene".to_string()]));
    }

    #[test]
    fn test_select_by_class_and_hypernym() {
        let (g, l) = (graph(), lexicon());
        assert_eq!(
            run("select", "truck", &[], &g, &l).unwrap(),
            Value::Objects(vec!["1".to_string()])
        );
        // "vehicle" reaches both truck and car through the category table.
        assert_eq!(
            run("select", "vehicle", &[], &g, &l).unwrap(),
            Value::Objects(vec!["1".to_string(), "3".to_string()])
        );
    }

    #[test]
    fn test_select_strips_annotation() {
        let (g, l) = (graph(), lexicon());
        assert_eq!(
            run("select", "truck (42)", &[], &g, &l).unwrap(),
            Value::Objects(vec!["1".to_string()])
        );
    }

    #[test]
    fn test_relate_outgoing() {
        let (g, l) = (graph(), lexicon());
        let trucks = Value::Objects(vec!["1".to_string()]);
        let v = run("relate", "tire,of,o", &[&trucks], &g, &l).unwrap();
        assert_eq!(v, Value::Objects(vec!["2".to_string()]));
    }

    #[test]
    fn test_relate_incoming() {
        let (g, l) = (graph(), lexicon());
        let tires = Value::Objects(vec!["2".to_string()]);
        let v = run("relate", "_,of,s", &[&tires], &g, &l).unwrap();
        assert_eq!(
            v,
            Value::Objects(vec!["1".to_string(), "3".to_string()])
        );
    }

    #[test]
    fn test_relate_both_directions() {
        let (g, l) = (graph(), lexicon());
        let trucks = Value::Objects(vec!["1".to_string()]);
        let v = run("relate", "_,of,_", &[&trucks], &g, &l).unwrap();
        // outgoing "of" reaches the tire; nothing points at the truck
        assert_eq!(v, Value::Objects(vec!["2".to_string()]));
    }

    #[test]
    fn test_relate_class_filter() {
        let (g, l) = (graph(), lexicon());
        let trucks = Value::Objects(vec!["1".to_string()]);
        // "near" reaches the car, but the class must also match
        assert_eq!(
            run("relate", "car,near,o", &[&trucks], &g, &l).unwrap(),
            Value::Objects(vec!["3".to_string()])
        );
        assert_eq!(
            run("relate", "tire,near,o", &[&trucks], &g, &l).unwrap(),
            Value::Objects(vec![])
        );
    }

    #[test]
    fn test_relate_same_category() {
        let (g, l) = (graph(), lexicon());
        let trucks = Value::Objects(vec!["1".to_string()]);
        // truck is red; the car it points at is red too
        assert_eq!(
            run("relate", "car,same color,o", &[&trucks], &g, &l).unwrap(),
            Value::Objects(vec!["3".to_string()])
        );
        // but sizes differ
        assert_eq!(
            run("relate", "car,same size,o", &[&trucks], &g, &l).unwrap(),
            Value::Objects(vec![])
        );
    }

    #[test]
    fn test_common() {
        let (g, l) = (graph(), lexicon());
        let trucks = Value::Objects(vec!["1".to_string()]);
        let cars = Value::Objects(vec!["3".to_string()]);
        let v = run("common", "", &[&trucks, &cars], &g, &l).unwrap();
        assert_eq!(v, Value::Str("color".to_string()));
    }

    #[test]
    fn test_verify_attribute() {
        let (g, l) = (graph(), lexicon());
        let tires = Value::Objects(vec!["2".to_string()]);
        assert_eq!(
            run("verify", "black", &[&tires], &g, &l).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            run("verify", "red", &[&tires], &g, &l).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_verify_aux_field() {
        let (g, l) = (graph(), lexicon());
        let tires = Value::Objects(vec!["2".to_string()]);
        assert_eq!(
            run("verify hposition", "right", &[&tires], &g, &l).unwrap(),
            Value::Bool(true)
        );
        let scene = Value::Objects(vec!["scene".to_string()]);
        assert_eq!(
            run("verify weather", "rainy", &[&scene], &g, &l).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_verify_ambiguous() {
        let (g, l) = (graph(), lexicon());
        let both = Value::Objects(vec!["1".to_string(), "3".to_string()]);
        let err = run("verify", "red", &[&both], &g, &l).unwrap_err();
        assert_eq!(err, Fault::AmbiguousAnswer);
    }

    #[test]
    fn test_verify_empty_dependency_is_false() {
        let (g, l) = (graph(), lexicon());
        let none = Value::Objects(vec![]);
        assert_eq!(
            run("verify", "red", &[&none], &g, &l).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_verify_rel() {
        let (g, l) = (graph(), lexicon());
        let trucks = Value::Objects(vec!["1".to_string()]);
        assert_eq!(
            run("verify rel", "tire,of,o", &[&trucks], &g, &l).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            run("verify rel", "tire,under,o", &[&trucks], &g, &l).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_choose_attribute() {
        let (g, l) = (graph(), lexicon());
        let tires = Value::Objects(vec!["2".to_string()]);
        assert_eq!(
            run("choose", "black|white", &[&tires], &g, &l).unwrap(),
            Value::Str("black".to_string())
        );
        // no option matches → no answer, not a fault
        assert_eq!(
            run("choose", "green|white", &[&tires], &g, &l).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_choose_empty_argument() {
        let (g, l) = (graph(), lexicon());
        let tires = Value::Objects(vec!["2".to_string()]);
        let err = run("choose", "", &[&tires], &g, &l).unwrap_err();
        assert_eq!(err, Fault::EmptyChoice);
    }

    #[test]
    fn test_choose_rel_first_option() {
        let (g, l) = (graph(), lexicon());
        let trucks = Value::Objects(vec!["1".to_string()]);
        assert_eq!(
            run("choose rel", "tire,of|under,o", &[&trucks], &g, &l).unwrap(),
            Value::Str("of".to_string())
        );
    }

    #[test]
    fn test_choose_rel_falls_back_to_second() {
        let (g, l) = (graph(), lexicon());
        let trucks = Value::Objects(vec!["1".to_string()]);
        assert_eq!(
            run("choose rel", "tire,under|of,o", &[&trucks], &g, &l).unwrap(),
            Value::Str("of".to_string())
        );
    }

    #[test]
    fn test_choose_rel_neither_is_missing_edge() {
        let (g, l) = (graph(), lexicon());
        let trucks = Value::Objects(vec!["1".to_string()]);
        let err = run("choose rel", "tire,under|above,o", &[&trucks], &g, &l).unwrap_err();
        assert_eq!(err, Fault::MissingEdge);
    }

    #[test]
    fn test_filter_attributes() {
        let (g, l) = (graph(), lexicon());
        let all = Value::Objects(vec!["1".to_string(), "2".to_string(), "3".to_string()]);
        assert_eq!(
            run("filter", "red", &[&all], &g, &l).unwrap(),
            Value::Objects(vec!["1".to_string(), "3".to_string()])
        );
    }

    #[test]
    fn test_filter_negated() {
        let (g, l) = (graph(), lexicon());
        let all = Value::Objects(vec!["1".to_string(), "2".to_string(), "3".to_string()]);
        assert_eq!(
            run("filter", "not(red)", &[&all], &g, &l).unwrap(),
            Value::Objects(vec!["2".to_string()])
        );
    }

    #[test]
    fn test_filter_position() {
        let (g, l) = (graph(), lexicon());
        let all = Value::Objects(vec!["1".to_string(), "2".to_string(), "3".to_string()]);
        assert_eq!(
            run("filter hposition", "right", &[&all], &g, &l).unwrap(),
            Value::Objects(vec!["2".to_string()])
        );
    }

    #[test]
    fn test_query_category() {
        let (g, l) = (graph(), lexicon());
        let tires = Value::Objects(vec!["2".to_string()]);
        assert_eq!(
            run("query", "color", &[&tires], &g, &l).unwrap(),
            Value::List(vec![Value::Str("black".to_string())])
        );
    }

    #[test]
    fn test_query_name() {
        let (g, l) = (graph(), lexicon());
        let tires = Value::Objects(vec!["2".to_string()]);
        assert_eq!(
            run("query", "name", &[&tires], &g, &l).unwrap(),
            Value::List(vec![Value::Str("tire".to_string())])
        );
    }

    #[test]
    fn test_query_place_unsupported() {
        let (g, l) = (graph(), lexicon());
        let scene = Value::Objects(vec!["scene".to_string()]);
        let err = run("query", "place", &[&scene], &g, &l).unwrap_err();
        assert_eq!(err, Fault::UnsupportedQuery);
    }

    #[test]
    fn test_query_empty_fails_fast() {
        let (g, l) = (graph(), lexicon());
        let none = Value::Objects(vec![]);
        let err = run("query", "color", &[&none], &g, &l).unwrap_err();
        assert_eq!(err, Fault::EmptyQuery);
    }

    #[test]
    fn test_query_weather_of_object_reads_attributes() {
        let (g, l) = (graph(), lexicon());
        let tires = Value::Objects(vec!["2".to_string()]);
        let v = run("query", "weather", &[&tires], &g, &l).unwrap();
        assert_eq!(
            v,
            Value::List(vec![Value::List(vec![
                Value::Str("black".to_string()),
                Value::Str("round".to_string()),
            ])])
        );
    }

    #[test]
    fn test_same_by_name() {
        let (g, l) = (graph(), lexicon());
        let trucks = Value::Objects(vec!["1".to_string()]);
        let cars = Value::Objects(vec!["3".to_string()]);
        assert_eq!(
            run("same", "name", &[&trucks, &cars], &g, &l).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            run("same", "type", &[&trucks, &trucks], &g, &l).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_same_by_category_qualifier() {
        let (g, l) = (graph(), lexicon());
        let both = Value::Objects(vec!["1".to_string(), "3".to_string()]);
        assert_eq!(
            run("same color", "", &[&both], &g, &l).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            run("same size", "", &[&both], &g, &l).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_same_unsupported_category() {
        let (g, l) = (graph(), lexicon());
        let trucks = Value::Objects(vec!["1".to_string()]);
        let err = run("same", "color", &[&trucks], &g, &l).unwrap_err();
        assert_eq!(err, Fault::UnsupportedCategory("color".to_string()));
    }

    #[test]
    fn test_different_negates_same() {
        let (g, l) = (graph(), lexicon());
        let trucks = Value::Objects(vec!["1".to_string()]);
        let cars = Value::Objects(vec!["3".to_string()]);
        let same = run("same", "name", &[&trucks, &cars], &g, &l).unwrap();
        let different = run("different", "name", &[&trucks, &cars], &g, &l).unwrap();
        assert_eq!(same, Value::Bool(false));
        assert_eq!(different, Value::Bool(true));
    }

    #[test]
    fn test_and_or() {
        let (g, l) = (graph(), lexicon());
        let t = Value::Bool(true);
        let f = Value::Bool(false);
        assert_eq!(run("and", "", &[&t, &f], &g, &l).unwrap(), Value::Bool(false));
        assert_eq!(run("or", "", &[&t, &f], &g, &l).unwrap(), Value::Bool(true));
        // node sets are truthy when non-empty
        let some = Value::Objects(vec!["1".to_string()]);
        let none = Value::Objects(vec![]);
        assert_eq!(
            run("and", "", &[&some, &none], &g, &l).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_exist() {
        let (g, l) = (graph(), lexicon());
        let some = Value::Objects(vec!["1".to_string()]);
        let none = Value::Objects(vec![]);
        assert_eq!(run("exist", "?", &[&some], &g, &l).unwrap(), Value::Bool(true));
        assert_eq!(run("exist", "?", &[&none], &g, &l).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_exist_rejects_bool_dependency() {
        let (g, l) = (graph(), lexicon());
        let b = Value::Bool(true);
        let err = run("exist", "?", &[&b], &g, &l).unwrap_err();
        assert_eq!(err.kind(), "type_mismatch");
    }

    #[test]
    fn test_many_attr_candidates() {
        let (g, l) = (graph(), lexicon());
        let both = Value::Objects(vec!["1".to_string(), "3".to_string()]);
        let tires = Value::Objects(vec!["2".to_string()]);
        let err = run("common", "", &[&both, &tires], &g, &l).unwrap_err();
        assert_eq!(err, Fault::ManyAttrCandidates);
        assert!(err.is_known());
    }

    #[test]
    fn test_missing_dependency() {
        let (g, l) = (graph(), lexicon());
        let err = run("exist", "?", &[], &g, &l).unwrap_err();
        assert_eq!(err, Fault::MissingDependency(0));
    }

    #[test]
    fn test_relate_malformed_argument() {
        let (g, l) = (graph(), lexicon());
        let trucks = Value::Objects(vec!["1".to_string()]);
        let err = run("relate", "tire,of", &[&trucks], &g, &l).unwrap_err();
        assert_eq!(err.kind(), "malformed_argument");
    }
}
