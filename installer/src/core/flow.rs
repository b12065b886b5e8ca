//! Conditional question tree.
//!
//! The wizard is a tree of guarded nodes walked depth-first, pre-order. A
//! node runs only when all of its guards hold against answers already given
//! by its ancestors; when a node is skipped, its whole subtree is skipped.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow};

use crate::core::options::OptionTable;
use crate::core::question::{NO, Question, YES};
use crate::core::snapshot::{ConfigSnapshot, EnvKey};

/// Holds when an ancestor's resolved answer equals `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    node: &'static str,
    value: &'static str,
}

impl Guard {
    pub fn node(&self) -> &'static str {
        self.node
    }

    pub fn value(&self) -> &'static str {
        self.value
    }

    pub fn holds(&self, answers: &Answers) -> bool {
        answers.get(self.node) == Some(self.value)
    }
}

pub fn answer_is(node: &'static str, value: &'static str) -> Guard {
    Guard { node, value }
}

pub fn yes(node: &'static str) -> Guard {
    answer_is(node, YES)
}

pub fn no(node: &'static str) -> Guard {
    answer_is(node, NO)
}

/// Transform from a resolved answer into a derived key value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeriveRule {
    /// `True` -> `true`, `False` -> `false`.
    Lowercase,
    /// `True` -> `false`, `False` -> `true`.
    Negated,
    /// Option label -> internal option name.
    OptionName(OptionTable),
    /// Ignore the answer and write a fixed value.
    Constant(&'static str),
}

impl DeriveRule {
    pub fn apply(&self, answer: &str) -> Result<String> {
        match self {
            DeriveRule::Lowercase => Ok(answer.to_lowercase()),
            DeriveRule::Negated => match answer {
                YES => Ok("false".to_string()),
                NO => Ok("true".to_string()),
                other => Err(anyhow!("cannot negate non-boolean answer {other:?}")),
            },
            DeriveRule::OptionName(table) => table
                .name_for_label(answer)
                .map(str::to_string)
                .ok_or_else(|| anyhow!("{answer:?} is not an option of {}", table.id)),
            DeriveRule::Constant(value) => Ok((*value).to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derive {
    pub key: EnvKey,
    pub rule: DeriveRule,
}

impl Derive {
    /// Apply the rule and write the result into `snapshot`.
    pub fn write(&self, answer: &str, snapshot: &mut ConfigSnapshot) -> Result<()> {
        let value = self.rule.apply(answer)?;
        snapshot.set(self.key, value);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No prompt; only scopes children under guards.
    Group,
    Notice(&'static str),
    Ask {
        question: Question,
        derived: Vec<Derive>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: &'static str,
    pub guards: Vec<Guard>,
    pub action: Action,
    pub children: Vec<Node>,
}

impl Node {
    fn new(id: &'static str, action: Action) -> Self {
        Self {
            id,
            guards: Vec::new(),
            action,
            children: Vec::new(),
        }
    }

    pub fn group(id: &'static str) -> Self {
        Self::new(id, Action::Group)
    }

    pub fn notice(id: &'static str, text: &'static str) -> Self {
        Self::new(id, Action::Notice(text))
    }

    pub fn ask(id: &'static str, question: Question) -> Self {
        Self::new(
            id,
            Action::Ask {
                question,
                derived: Vec::new(),
            },
        )
    }

    pub fn when(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// Add a derived write. Only nodes that ask have an answer to derive from.
    pub fn derive(mut self, key: EnvKey, rule: DeriveRule) -> Self {
        debug_assert!(
            matches!(self.action, Action::Ask { .. }),
            "derived write {key} on node '{}' that asks nothing",
            self.id
        );
        if let Action::Ask { derived, .. } = &mut self.action {
            derived.push(Derive { key, rule });
        }
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn question(&self) -> Option<&Question> {
        match &self.action {
            Action::Ask { question, .. } => Some(question),
            _ => None,
        }
    }

    pub fn derived(&self) -> &[Derive] {
        match &self.action {
            Action::Ask { derived, .. } => derived,
            _ => &[],
        }
    }

    pub fn guards_hold(&self, answers: &Answers) -> bool {
        self.guards.iter().all(|guard| guard.holds(answers))
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Resolved answers by node id, for guard evaluation only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    by_node: BTreeMap<&'static str, String>,
}

impl Answers {
    pub fn record(&mut self, node: &'static str, answer: impl Into<String>) {
        self.by_node.insert(node, answer.into());
    }

    pub fn get(&self, node: &str) -> Option<&str> {
        self.by_node.get(node).map(String::as_str)
    }

    pub fn contains(&self, node: &str) -> bool {
        self.by_node.contains_key(node)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_node.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::BinaryMode;

    #[test]
    fn guards_compare_recorded_answers() {
        let mut answers = Answers::default();
        answers.record("metrics", YES);
        assert!(yes("metrics").holds(&answers));
        assert!(!no("metrics").holds(&answers));
        assert!(!yes("missing").holds(&answers));
    }

    #[test]
    fn derive_rules_transform_answers() {
        assert_eq!(DeriveRule::Lowercase.apply(YES).expect("lower"), "true");
        assert_eq!(DeriveRule::Negated.apply(YES).expect("neg"), "false");
        assert_eq!(DeriveRule::Negated.apply(NO).expect("neg"), "true");
        assert!(DeriveRule::Negated.apply("maybe").is_err());
        assert_eq!(
            DeriveRule::OptionName(BinaryMode::TABLE)
                .apply("s3 remote storage")
                .expect("name"),
            "s3"
        );
        assert!(DeriveRule::OptionName(BinaryMode::TABLE).apply("s3").is_err());
        assert_eq!(DeriveRule::Constant("x").apply("ignored").expect("const"), "x");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "asks nothing")]
    fn derive_on_non_ask_node_panics() {
        let _ = Node::group("g").derive(EnvKey::Metrics, DeriveRule::Lowercase);
    }

    #[test]
    fn find_searches_depth_first() {
        let tree = Node::group("root")
            .child(Node::group("a").child(Node::group("a1")))
            .child(Node::group("b"));
        assert_eq!(tree.find("a1").map(|node| node.id), Some("a1"));
        assert_eq!(tree.find("b").map(|node| node.id), Some("b"));
        assert!(tree.find("c").is_none());
    }
}
