//! Static invariants of the question tree.

use std::collections::{HashMap, HashSet};

use crate::core::flow::{DeriveRule, Node};
use crate::core::question::{NO, QuestionKind, YES};
use crate::core::snapshot::EnvKey;

/// Check structural invariants of a question tree:
/// - No duplicate node ids
/// - Guards reference ancestor questions only, with reachable values
/// - Choices present iff the question is single-choice
/// - Single-choice defaults are among the choices
/// - Secrets carry no default
/// - Each output or derived key is written by at most one node
/// - Option-name rules can map every choice of their question
pub fn validate_tree(root: &Node) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut writers: HashMap<EnvKey, &'static str> = HashMap::new();
    let mut ancestors = Vec::new();
    validate_node(
        root,
        &mut ancestors,
        &mut seen,
        &mut writers,
        &mut errors,
        root.id,
    );
    errors
}

fn validate_node<'a>(
    node: &'a Node,
    ancestors: &mut Vec<&'a Node>,
    seen: &mut HashSet<&'static str>,
    writers: &mut HashMap<EnvKey, &'static str>,
    errors: &mut Vec<String>,
    path: &str,
) {
    if !seen.insert(node.id) {
        errors.push(format!("duplicate id '{}' at {}", node.id, path));
    }

    for guard in &node.guards {
        let Some(target) = ancestors.iter().find(|ancestor| ancestor.id == guard.node()) else {
            errors.push(format!(
                "{}: guard references '{}' which is not an ancestor",
                path,
                guard.node()
            ));
            continue;
        };
        let Some(question) = target.question() else {
            errors.push(format!(
                "{}: guard references '{}' which asks nothing",
                path,
                guard.node()
            ));
            continue;
        };
        let reachable = match question.kind {
            QuestionKind::SingleChoice => question.choices.iter().any(|c| c == guard.value()),
            QuestionKind::YesNo => guard.value() == YES || guard.value() == NO,
            QuestionKind::FreeText | QuestionKind::Secret => true,
        };
        if !reachable {
            errors.push(format!(
                "{}: guard value {:?} can never be answered by '{}'",
                path,
                guard.value(),
                guard.node()
            ));
        }
    }

    if let Some(question) = node.question() {
        let is_choice = question.kind == QuestionKind::SingleChoice;
        if is_choice && question.choices.is_empty() {
            errors.push(format!("{}: single-choice question has no choices", path));
        }
        if !is_choice && !question.choices.is_empty() {
            errors.push(format!("{}: choices on a non-choice question", path));
        }
        if is_choice
            && let Some(default) = question.default.as_deref()
            && !question.choices.iter().any(|c| c == default)
        {
            errors.push(format!("{}: default {:?} is not a choice", path, default));
        }
        if question.kind == QuestionKind::Secret && question.default.is_some() {
            errors.push(format!("{}: secret question must not have a default", path));
        }

        let targets = question
            .output_keys
            .iter()
            .copied()
            .chain(node.derived().iter().map(|derive| derive.key));
        for key in targets {
            if let Some(previous) = writers.insert(key, node.id)
                && previous != node.id
            {
                errors.push(format!(
                    "{}: key {} already written by '{}'",
                    path, key, previous
                ));
            }
        }

        for derive in node.derived() {
            if let DeriveRule::OptionName(table) = &derive.rule {
                for choice in &question.choices {
                    if table.name_for_label(choice).is_none() {
                        errors.push(format!(
                            "{}: choice {:?} has no name in option set {}",
                            path, choice, table.id
                        ));
                    }
                }
            }
            if derive.rule == DeriveRule::Negated && question.kind != QuestionKind::YesNo {
                errors.push(format!("{}: negated write on a non yes/no question", path));
            }
        }
    }

    ancestors.push(node);
    for child in &node.children {
        let child_path = format!("{}/{}", path, child.id);
        validate_node(child, ancestors, seen, writers, errors, &child_path);
    }
    ancestors.pop();
}
