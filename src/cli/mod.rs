//! Command-line interface for tokengraph.
//!
//! Provides commands for tokenizing text, building a throwaway inverted
//! index, running task files and showing the resolved configuration.

use std::collections::BTreeSet;
use std::io::{self, IsTerminal, Read};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config;
use crate::core::{Task, TaskContext, TokenIndex};
use crate::domain::Version;
use crate::store::{GraphStore, MemoryGraph};
use crate::tokenize::TokenizerFactory;

/// tokengraph - Versioned token vocabulary and inverted index over a graph
#[derive(Parser, Debug)]
#[command(name = "tokengraph")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the tokens of each text
    Tokenize {
        /// Tokenizer variant (defaults to the configured one)
        #[arg(short, long)]
        tokenizer: Option<String>,

        /// Preprocessor applied before splitting
        #[arg(short, long)]
        preprocessor: Option<String>,

        /// Texts to tokenize (reads stdin if none given)
        texts: Vec<String>,
    },

    /// Index texts into an in-memory graph and print the inverted index
    Index {
        /// Label relating each text to its node
        #[arg(short, long)]
        label: String,

        #[arg(short, long)]
        tokenizer: Option<String>,

        #[arg(short, long)]
        preprocessor: Option<String>,

        #[arg(short, long)]
        content_type: Option<String>,

        /// Texts to index (reads stdin if none given)
        texts: Vec<String>,
    },

    /// Run a task file
    Run {
        /// Task path, or name inside the tasks directory
        task: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Tokenize {
                tokenizer,
                preprocessor,
                texts,
            } => tokenize(tokenizer, preprocessor, texts),
            Commands::Index {
                label,
                tokenizer,
                preprocessor,
                content_type,
                texts,
            } => index_texts(&label, tokenizer, preprocessor, content_type, texts).await,
            Commands::Run { task } => run_task(&task).await,
            Commands::Config => show_config(),
        }
    }
}

/// Use the given texts, or read one text from stdin when it is piped
fn collect_texts(texts: Vec<String>) -> Result<Vec<String>> {
    if !texts.is_empty() {
        return Ok(texts);
    }

    if io::stdin().is_terminal() {
        anyhow::bail!("No input provided. Pass texts as arguments or pipe to stdin");
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;

    if buffer.trim().is_empty() {
        anyhow::bail!("Input is empty");
    }
    Ok(vec![buffer])
}

fn tokenize(
    tokenizer: Option<String>,
    preprocessor: Option<String>,
    texts: Vec<String>,
) -> Result<()> {
    let cfg = config::config()?;
    let texts = collect_texts(texts)?;

    let variant = tokenizer.unwrap_or_else(|| cfg.tokenizer.variant.clone());
    let preprocessor = preprocessor.or_else(|| cfg.tokenizer.preprocessor.clone());

    let bundles = TokenizerFactory::new().tokenize_strings(
        &variant,
        preprocessor.as_deref(),
        &cfg.tokenizer.content_type,
        &texts,
    )?;

    for bundle in bundles {
        println!("{}", bundle.tokens.join(" | "));
    }

    Ok(())
}

async fn index_texts(
    label: &str,
    tokenizer: Option<String>,
    preprocessor: Option<String>,
    content_type: Option<String>,
    texts: Vec<String>,
) -> Result<()> {
    let cfg = config::config()?;
    let texts = collect_texts(texts)?;

    let variant = tokenizer.unwrap_or_else(|| cfg.tokenizer.variant.clone());
    let preprocessor = preprocessor.or_else(|| cfg.tokenizer.preprocessor.clone());
    let content_type = content_type.unwrap_or_else(|| cfg.tokenizer.content_type.clone());

    let store: Arc<dyn GraphStore> = Arc::new(MemoryGraph::new());
    let index = TokenIndex::new(store.clone());
    let version = Version::ZERO;

    index.initialize_corpus(version).await?;
    let bundles = index.tokenize_strings_using_tokenizer(
        &variant,
        preprocessor.as_deref(),
        &content_type,
        &texts,
    )?;

    let mut nodes = Vec::with_capacity(texts.len());
    for _ in &texts {
        nodes.push(store.create_node(version).await?);
    }
    let labels = vec![label.to_string(); texts.len()];

    let related = index
        .create_or_update_tokenize_relations_to_nodes(version, &bundles, &nodes, &labels)
        .await?;

    let mut tokens = BTreeSet::new();
    for item in &related {
        let record = index.relations().read_content(version, item.content).await?;
        let names = index.vocabulary().token_names(version, &record.tokens).await?;
        println!("{} {} [{}]: {}", item.node, record.label, record.content_type, names.join(" "));
        tokens.extend(record.tokens);
    }

    println!();
    println!("Inverted index:");
    for token in tokens {
        let names = index.vocabulary().token_names(version, &[token]).await?;
        let name = names.first().map(String::as_str).unwrap_or_default();
        for entry in index.vocabulary().postings(version, token).await? {
            println!(
                "  {:<20} {} [{}] at {:?}",
                name, entry.content, entry.content_type, entry.positions
            );
        }
    }

    Ok(())
}

async fn run_task(name: &str) -> Result<()> {
    let cfg = config::config()?;
    let path = cfg.task_path(name);

    if !path.exists() {
        anyhow::bail!("Task '{}' not found. Looked for: {}", name, path.display());
    }

    let task = Task::from_file(&path)?;
    task.validate()?;

    let store: Arc<dyn GraphStore> = Arc::new(MemoryGraph::new());
    let index = TokenIndex::new(store.clone());
    let mut ctx = TaskContext::new(Version::ZERO);

    let result = task.execute(&index, &mut ctx).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    eprintln!(
        "\n[Task {} completed on chain {} at {} ({} store)]",
        task.name,
        ctx.id(),
        ctx.current_version(),
        store.name()
    );

    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("tokengraph configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:  {}", cfg.home.display());
    println!("  Tasks: {}", cfg.tasks.display());
    println!();
    println!("Tokenizer:");
    println!("  Variant:      {}", cfg.tokenizer.variant);
    println!(
        "  Preprocessor: {}",
        cfg.tokenizer.preprocessor.as_deref().unwrap_or("(none)")
    );
    println!("  Content type: {}", cfg.tokenizer.content_type);
    println!();
    println!("Logging filter: {}", cfg.log_filter);

    Ok(())
}
