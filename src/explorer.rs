// Interactive explorer — a terminal REPL over cached cluster models.
//
//   k <n>        switch to n categories (5..=25), fitting on first use
//   categories   every category with 5 keywords and 3 titles
//   stats        dataset and model size
//   help         this list
//   quit         leave
//
// Any other line is treated as a plot summary and classified.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use tracing::{info, warn};

use crate::clustering::keywords::DEFAULT_KEYWORDS;
use crate::clustering::model::{ClusterModel, ClusterSettings, ModelCache};
use crate::config::{Config, EXPLORER_K_MAX, EXPLORER_K_MIN};
use crate::dataset::Document;
use crate::error::ClusterError;
use crate::output::terminal;

/// Keywords and titles on a category card.
pub const CARD_KEYWORDS: usize = 5;
pub const CARD_EXAMPLES: usize = 3;
/// Similar titles listed after classifying a summary.
pub const CLASSIFY_EXAMPLES: usize = 5;

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetK(usize),
    Categories,
    Stats,
    Help,
    Quit,
    Classify(String),
    Empty,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default().to_lowercase();
        match (head.as_str(), words.next(), words.next()) {
            ("k", Some(n), None) => match n.parse::<usize>() {
                Ok(k) => Command::SetK(k),
                Err(_) => Command::Invalid(format!("'{n}' is not a number")),
            },
            ("k", None, None) => Command::Invalid("usage: k <n>".to_string()),
            ("categories", None, None) => Command::Categories,
            ("stats", None, None) => Command::Stats,
            ("help", None, None) => Command::Help,
            ("quit" | "exit", None, None) => Command::Quit,
            _ => Command::Classify(line.to_string()),
        }
    }
}

/// REPL state: the corpus, the active k and every model fitted so far.
pub struct Explorer {
    documents: Vec<Document>,
    settings: ClusterSettings,
    cache: ModelCache,
    k: usize,
}

impl Explorer {
    pub fn new(documents: Vec<Document>, settings: ClusterSettings, k: usize) -> Result<Self> {
        Config::require_explorer_k(k)?;
        Ok(Self {
            documents,
            settings,
            cache: ModelCache::default(),
            k,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    /// Model for the active k.
    pub fn model(&mut self) -> Result<Arc<ClusterModel>> {
        Ok(self.cache.get_or_fit(&self.documents, &self.settings, self.k)?)
    }

    /// Execute one command. Returns false when the session should end.
    pub fn execute(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Quit => return Ok(false),
            Command::Empty => {}
            Command::Help => print_help(),
            Command::Invalid(message) => println!("  {}", message.yellow()),
            Command::SetK(k) => {
                if !(EXPLORER_K_MIN..=EXPLORER_K_MAX).contains(&k) {
                    println!(
                        "  {}",
                        format!("k must be between {EXPLORER_K_MIN} and {EXPLORER_K_MAX}").yellow()
                    );
                } else {
                    if !self.cache.contains(k) {
                        println!("Fitting {k} categories...");
                    }
                    self.cache.get_or_fit(&self.documents, &self.settings, k)?;
                    self.k = k;
                    println!("Now using {k} categories.");
                }
            }
            Command::Categories => {
                let model = self.model()?;
                terminal::display_cluster_summaries(&model.summaries(CARD_KEYWORDS, CARD_EXAMPLES)?);
            }
            Command::Stats => {
                let model = self.model()?;
                terminal::display_stats(
                    model.document_count(),
                    model.k(),
                    model.vocabulary().len(),
                    model.inertia()?,
                );
            }
            Command::Classify(text) => {
                let model = self.model()?;
                match model.classify(&text, DEFAULT_KEYWORDS, CLASSIFY_EXAMPLES) {
                    Ok(classification) => terminal::display_classification(&classification),
                    Err(ClusterError::EmptyInput) => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(true)
    }

    /// Read commands from `input` until `quit` or end of input.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        let banner = format!(
            "Plot explorer: {} titles, {} categories. Type 'help' for commands.",
            self.documents.len(),
            self.k
        );
        println!("{}", banner.bold());
        self.model()?;
        info!(k = self.k, "Explorer ready");

        prompt()?;
        for line in input.lines() {
            let line = line?;
            match self.execute(Command::parse(&line)) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!(error = %e, "Explorer command failed");
                    terminal::warn_user(&format!("{e:#}"));
                }
            }
            prompt()?;
        }
        println!("Bye.");
        Ok(())
    }
}

fn prompt() -> Result<()> {
    print!("{} ", ">".cyan().bold());
    io::stdout().flush()?;
    Ok(())
}

fn print_help() {
    println!("\n{}", "Commands".bold());
    println!("  k <n>         switch to n categories ({EXPLORER_K_MIN}-{EXPLORER_K_MAX})");
    println!("  categories    list every category");
    println!("  stats         dataset and model size");
    println!("  help          show this list");
    println!("  quit          leave the explorer");
    println!("  anything else is classified as a plot summary\n");
}
