//! Per-chain execution state.
//!
//! A context carries the version the chain reads and writes at, the result
//! of the last action, and named variables. Contexts are never shared
//! between chains, so time travel in one chain does not move another.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{NodeId, RebuiltContent, TokenBundle, Version};
use crate::error::{Result, TokenError};

/// Value produced by an action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum TaskResult {
    #[default]
    Empty,
    Nodes(Vec<NodeId>),
    Bundles(Vec<TokenBundle>),
    Rebuilt(Vec<RebuiltContent>),
}

impl TaskResult {
    pub fn kind(&self) -> &'static str {
        match self {
            TaskResult::Empty => "nothing",
            TaskResult::Nodes(_) => "nodes",
            TaskResult::Bundles(_) => "bundles",
            TaskResult::Rebuilt(_) => "rebuilt contents",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TaskResult::Empty => 0,
            TaskResult::Nodes(items) => items.len(),
            TaskResult::Bundles(items) => items.len(),
            TaskResult::Rebuilt(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nodes held by this result; an empty result counts as no nodes
    pub fn as_nodes(&self) -> Result<&[NodeId]> {
        match self {
            TaskResult::Nodes(nodes) => Ok(nodes),
            TaskResult::Empty => Ok(&[]),
            other => Err(TokenError::VariableKind {
                expected: "nodes",
                found: other.kind(),
            }),
        }
    }

    /// Bundles held by this result; an empty result counts as no bundles
    pub fn as_bundles(&self) -> Result<&[TokenBundle]> {
        match self {
            TaskResult::Bundles(bundles) => Ok(bundles),
            TaskResult::Empty => Ok(&[]),
            other => Err(TokenError::VariableKind {
                expected: "bundles",
                found: other.kind(),
            }),
        }
    }

    /// Append `other`, which must be empty or of the same kind
    pub fn append(&mut self, other: TaskResult) -> Result<()> {
        if matches!(other, TaskResult::Empty) {
            return Ok(());
        }
        if matches!(self, TaskResult::Empty) {
            *self = other;
            return Ok(());
        }

        match (self, other) {
            (TaskResult::Nodes(mine), TaskResult::Nodes(more)) => mine.extend(more),
            (TaskResult::Bundles(mine), TaskResult::Bundles(more)) => mine.extend(more),
            (TaskResult::Rebuilt(mine), TaskResult::Rebuilt(more)) => mine.extend(more),
            (mine, other) => {
                return Err(TokenError::VariableKind {
                    expected: mine.kind(),
                    found: other.kind(),
                })
            }
        }
        Ok(())
    }
}

/// State of one continuation chain
#[derive(Debug, Clone)]
pub struct TaskContext {
    id: Uuid,
    version: Version,
    result: TaskResult,
    variables: HashMap<String, TaskResult>,
}

impl Default for TaskContext {
    fn default() -> Self {
        Self::new(Version::ZERO)
    }
}

impl TaskContext {
    /// Start a chain at `version`
    pub fn new(version: Version) -> Self {
        Self {
            id: Uuid::new_v4(),
            version,
            result: TaskResult::Empty,
            variables: HashMap::new(),
        }
    }

    /// Chain identifier, for correlating log lines
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn current_version(&self) -> Version {
        self.version
    }

    /// Move the chain to another version; later reads and writes use it
    pub fn travel_to(&mut self, version: Version) {
        self.version = version;
    }

    pub fn result(&self) -> &TaskResult {
        &self.result
    }

    pub fn set_result(&mut self, result: TaskResult) {
        self.result = result;
    }

    pub fn variable(&self, name: &str) -> Result<&TaskResult> {
        self.variables
            .get(name)
            .ok_or_else(|| TokenError::UnknownVariable(name.to_string()))
    }

    /// Bind `name` to `value`, replacing any previous binding
    pub fn define_var(&mut self, name: &str, value: TaskResult) {
        self.variables.insert(name.to_string(), value);
    }

    /// Append `value` to `name`, creating the variable when absent
    pub fn add_to_var(&mut self, name: &str, value: TaskResult) -> Result<()> {
        self.variables
            .entry(name.to_string())
            .or_default()
            .append(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_to() {
        let mut ctx = TaskContext::new(Version::ZERO);
        ctx.travel_to(Version::new(3));
        assert_eq!(ctx.current_version(), Version::new(3));
    }

    #[test]
    fn test_add_to_var_accumulates_in_order() {
        let mut ctx = TaskContext::default();
        let first = TokenBundle::new("t", vec!["a".to_string()]);
        let second = TokenBundle::new("t", vec!["b".to_string()]);

        ctx.define_var("tokenizer", TaskResult::Bundles(vec![first.clone()]));
        ctx.add_to_var("tokenizer", TaskResult::Bundles(vec![second.clone()]))
            .unwrap();

        assert_eq!(
            ctx.variable("tokenizer").unwrap(),
            &TaskResult::Bundles(vec![first, second])
        );
    }

    #[test]
    fn test_add_to_var_rejects_mixed_kinds() {
        let mut ctx = TaskContext::default();
        ctx.define_var("v", TaskResult::Nodes(vec![NodeId::new(1)]));

        let err = ctx
            .add_to_var("v", TaskResult::Bundles(vec![TokenBundle::new("t", vec![])]))
            .unwrap_err();
        assert!(matches!(err, TokenError::VariableKind { expected: "nodes", found: "bundles" }));
    }

    #[test]
    fn test_unknown_variable() {
        let ctx = TaskContext::default();
        assert!(matches!(ctx.variable("missing"), Err(TokenError::UnknownVariable(_))));
    }
}
