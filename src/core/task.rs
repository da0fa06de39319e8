//! Task definitions and execution.
//!
//! A task is a YAML list of actions run in order against one
//! [`TokenIndex`], threading a [`TaskContext`] from one action to the next.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::domain::schema::NAME;
use crate::domain::{Value, Version};
use crate::error::Result;

use super::context::{TaskContext, TaskResult};
use super::index::TokenIndex;

/// A named, ordered list of actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Task name (used in CLI)
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub actions: Vec<Action>,
}

/// One step of a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Move the chain to another version
    TravelInTime(Version),

    InitializeVocabulary,

    InitializeCorpus,

    RetrieveVocabularyNode,

    GetOrCreateTokensFromString(Vec<String>),

    TokenizeStringsUsingTokenizer {
        tokenizer: String,
        #[serde(default)]
        preprocessor: Option<String>,
        content_type: String,
        contents: Vec<String>,
    },

    /// Relate the bundles in one variable to the nodes in another
    CreateOrUpdateTokenizeRelationsToNodes {
        bundles: String,
        nodes: String,
        labels: Vec<String>,
    },

    /// Rebuild the tokenized contents held by a variable
    RebuildTokenizedContents(String),

    CreateNode {
        #[serde(default)]
        name: Option<String>,
    },

    ReadGlobalIndex {
        index: String,
        key: String,
        value: String,
    },

    /// Follow a relation from every node in the current result
    Traverse(String),

    DefineAsVar(String),

    AddToVar(String),

    ReadVar(String),
}

impl Task {
    /// Load a task from a YAML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read task file: {}", path.display()))?;

        Self::from_yaml(&content)
    }

    /// Parse a task from YAML content
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse task YAML")
    }

    /// Validate the task definition
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.is_empty() {
            anyhow::bail!("Task name cannot be empty");
        }

        if self.actions.is_empty() {
            anyhow::bail!("Task must have at least one action");
        }

        // Variables must be bound by an earlier action
        let mut defined: HashSet<&str> = HashSet::new();
        for (i, action) in self.actions.iter().enumerate() {
            for used in action.reads_variables() {
                if !defined.contains(used) {
                    anyhow::bail!(
                        "Action {} ({}) reads variable '{}' before it is defined",
                        i,
                        action.name(),
                        used
                    );
                }
            }

            match action {
                Action::DefineAsVar(name) | Action::AddToVar(name) => {
                    defined.insert(name.as_str());
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Run every action in order, stopping at the first failure.
    ///
    /// On failure the context keeps the state left by the last successful
    /// action.
    #[instrument(skip_all, fields(task = %self.name, chain = %ctx.id()))]
    pub async fn execute(&self, index: &TokenIndex, ctx: &mut TaskContext) -> Result<TaskResult> {
        info!(
            actions = self.actions.len(),
            version = %ctx.current_version(),
            "Starting task"
        );

        for (step, action) in self.actions.iter().enumerate() {
            debug!(
                step,
                action = action.name(),
                version = %ctx.current_version(),
                "Running action"
            );

            if let Err(e) = action.apply(index, ctx).await {
                error!(step, action = action.name(), error = %e, "Action failed");
                return Err(e);
            }
        }

        info!(result = ctx.result().kind(), items = ctx.result().len(), "Task completed");
        Ok(ctx.result().clone())
    }
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::TravelInTime(_) => "travel_in_time",
            Action::InitializeVocabulary => "initialize_vocabulary",
            Action::InitializeCorpus => "initialize_corpus",
            Action::RetrieveVocabularyNode => "retrieve_vocabulary_node",
            Action::GetOrCreateTokensFromString(_) => "get_or_create_tokens_from_string",
            Action::TokenizeStringsUsingTokenizer { .. } => "tokenize_strings_using_tokenizer",
            Action::CreateOrUpdateTokenizeRelationsToNodes { .. } => {
                "create_or_update_tokenize_relations_to_nodes"
            }
            Action::RebuildTokenizedContents(_) => "rebuild_tokenized_contents",
            Action::CreateNode { .. } => "create_node",
            Action::ReadGlobalIndex { .. } => "read_global_index",
            Action::Traverse(_) => "traverse",
            Action::DefineAsVar(_) => "define_as_var",
            Action::AddToVar(_) => "add_to_var",
            Action::ReadVar(_) => "read_var",
        }
    }

    fn reads_variables(&self) -> Vec<&str> {
        match self {
            Action::CreateOrUpdateTokenizeRelationsToNodes { bundles, nodes, .. } => {
                vec![bundles.as_str(), nodes.as_str()]
            }
            Action::RebuildTokenizedContents(var) | Action::ReadVar(var) => vec![var.as_str()],
            _ => Vec::new(),
        }
    }

    async fn apply(&self, index: &TokenIndex, ctx: &mut TaskContext) -> Result<()> {
        let version = ctx.current_version();

        let result = match self {
            Action::TravelInTime(to) => {
                ctx.travel_to(*to);
                return Ok(());
            }
            Action::InitializeVocabulary => {
                TaskResult::Nodes(vec![index.initialize_vocabulary(version).await?])
            }
            Action::InitializeCorpus => {
                let roots = index.initialize_corpus(version).await?;
                TaskResult::Nodes(vec![roots.vocabulary, roots.corpus])
            }
            Action::RetrieveVocabularyNode => {
                TaskResult::Nodes(vec![index.retrieve_vocabulary_node(version).await?])
            }
            Action::GetOrCreateTokensFromString(names) => {
                TaskResult::Nodes(index.get_or_create_tokens_from_string(version, names).await?)
            }
            Action::TokenizeStringsUsingTokenizer {
                tokenizer,
                preprocessor,
                content_type,
                contents,
            } => TaskResult::Bundles(index.tokenize_strings_using_tokenizer(
                tokenizer,
                preprocessor.as_deref(),
                content_type,
                contents,
            )?),
            Action::CreateOrUpdateTokenizeRelationsToNodes {
                bundles,
                nodes,
                labels,
            } => {
                let bundles = ctx.variable(bundles)?.as_bundles()?;
                let nodes = ctx.variable(nodes)?.as_nodes()?;
                let related = index
                    .create_or_update_tokenize_relations_to_nodes(version, bundles, nodes, labels)
                    .await?;
                TaskResult::Nodes(related.into_iter().map(|r| r.content).collect())
            }
            Action::RebuildTokenizedContents(var) => {
                let contents = ctx.variable(var)?.as_nodes()?;
                TaskResult::Rebuilt(index.rebuild_tokenized_contents(version, contents).await?)
            }
            Action::CreateNode { name } => {
                let node = index.store().create_node(version).await?;
                if let Some(name) = name {
                    index
                        .store()
                        .set_attribute(node, version, NAME, Value::from(name.as_str()))
                        .await?;
                }
                TaskResult::Nodes(vec![node])
            }
            Action::ReadGlobalIndex { index: name, key, value } => TaskResult::Nodes(
                index
                    .store()
                    .global_index_lookup(version, name, key, value)
                    .await?,
            ),
            Action::Traverse(relation) => {
                let mut reached = Vec::new();
                for node in ctx.result().as_nodes()? {
                    reached.extend(index.store().read_relation(*node, version, relation).await?);
                }
                TaskResult::Nodes(reached)
            }
            Action::DefineAsVar(name) => {
                let value = ctx.result().clone();
                ctx.define_var(name, value);
                return Ok(());
            }
            Action::AddToVar(name) => {
                let value = ctx.result().clone();
                return ctx.add_to_var(name, value);
            }
            Action::ReadVar(name) => ctx.variable(name)?.clone(),
        };

        ctx.set_result(result);
        Ok(())
    }
}
