//! Sift CLI
//!
//! Point at nodes of a JSON document with selectors, synthesize a unique
//! selector for each, and find the general selector shared by all of them.

mod render;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use sift_core::{DescriptorSet, Session, TreeAccess};
use sift_dom::NodeId;
use sift_page::Page;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use render::{Highlights, element_label, render_candidates, render_tree};

/// Sift - unique and general selector synthesis for document trees
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the document tree
    sift page.json tree

    # Candidates for the first node a selector matches
    sift page.json synth '//ul/li[2]'

    # Record two nodes and print the selector matching both
    sift page.json pick '//li[1]' '//li[2]' --tree

    # Copy the text of every match, one per line
    sift page.json pick '//li[1]' '//li[2]' --export

    # Use a custom descriptor set
    sift page.json --descriptors props.json synth '//a'
"#)]
struct Cli {
    /// JSON document to load
    #[arg(value_name = "DOC")]
    document: PathBuf,

    /// Descriptor set as a JSON array (default: tag, id, class, position)
    #[arg(short, long, value_name = "FILE", global = true)]
    descriptors: Option<PathBuf>,

    /// Log candidate generation and generalization
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the document tree
    Tree,

    /// Print the text of every node a selector matches
    Query {
        /// Selector to evaluate
        selector: String,
    },

    /// Synthesize candidates for the first node a selector matches
    Synth {
        /// Selector pointing at the target
        #[arg(value_name = "SELECTOR")]
        at: String,

        /// List every candidate instead of stopping at the first unique one
        #[arg(long)]
        all: bool,
    },

    /// Record several nodes and print their general selector
    Pick {
        /// Selectors pointing at the targets, recorded in order
        #[arg(value_name = "SELECTOR", required = true)]
        at: Vec<String>,

        /// Print the highlighted document tree
        #[arg(long)]
        tree: bool,

        /// Print only the text of every match, one per line
        #[arg(long)]
        export: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let page = Page::load(&cli.document)
        .with_context(|| format!("failed to load {}", cli.document.display()))?;
    let descriptors = load_descriptors(cli.descriptors.as_deref())?;
    let color = !cli.no_color;

    match cli.command {
        Command::Tree => {
            print!("{}", render_tree(&page.dom, page.dom.root(), &Highlights::default()));
        }
        Command::Query { selector } => {
            let session = Session::new(&page, descriptors);
            for node in session.matches(&selector)? {
                println!("{}", page.text_content(node));
            }
        }
        Command::Synth { at, all } => synth(&page, descriptors, &at, all, color)?,
        Command::Pick { at, tree, export } => pick(&page, descriptors, &at, tree, export, color)?,
    }
    Ok(())
}

/// `info` unless `--verbose`; `RUST_LOG` overrides the default.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_descriptors(path: Option<&Path>) -> Result<DescriptorSet> {
    let Some(path) = path else {
        return Ok(DescriptorSet::default());
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    DescriptorSet::from_json(&source)
        .with_context(|| format!("invalid descriptor set in {}", path.display()))
}

fn point(page: &Page, selector: &str) -> Result<NodeId> {
    page.point(selector)?
        .with_context(|| format!("`{selector}` matches nothing"))
}

fn label(page: &Page, node: NodeId) -> String {
    page.dom
        .as_element(node)
        .map_or_else(|| format!("{node:?}"), element_label)
}

fn synth(page: &Page, descriptors: DescriptorSet, at: &str, all: bool, color: bool) -> Result<()> {
    let session = Session::new(page, descriptors);
    let node = point(page, at)?;
    println!("{}", label(page, node));

    if all {
        let candidates = session.candidates(node);
        print!("{}", render_candidates(&candidates, false, color));
        return Ok(());
    }

    let synthesis = session.synthesize(node)?;
    if !synthesis.guaranteed_unique {
        warn!(selector = %at, "no candidate is unique; the last one is a fallback");
    }
    print!(
        "{}",
        render_candidates(&synthesis.candidates, synthesis.guaranteed_unique, color)
    );
    Ok(())
}

fn pick(
    page: &Page,
    descriptors: DescriptorSet,
    at: &[String],
    tree: bool,
    export: bool,
    color: bool,
) -> Result<()> {
    let mut session = Session::new(page, descriptors);

    for selector in at {
        let node = point(page, selector)?;
        let record = session.record(node)?;
        let Some(last) = record.candidates().last() else {
            continue;
        };
        info!(
            pointed = %selector,
            recorded = last.as_str(),
            unique = record.guaranteed_unique(),
            "recorded"
        );
        if !export {
            println!("{}  {}", label(page, record.resolved_node()), last);
        }

        if !session.is_generalizable() {
            continue;
        }
        if let Some(general) = session.current_general_selector()? {
            info!(
                selector = %general.selector,
                matches = general.match_count,
                "general selector"
            );
        }
    }

    let general = session.current_general_selector()?;
    let matches: Vec<NodeId> = match &general {
        Some(general) if session.is_generalizable() => session.matches(&general.selector)?,
        _ => Vec::new(),
    };

    if export {
        for &node in &matches {
            println!("{}", page.text_content(node));
        }
        return Ok(());
    }

    match &general {
        Some(general) if session.is_generalizable() => {
            let line = format!("{}  ({} matches)", general.selector, general.match_count);
            if color {
                println!("{}", line.blue());
            } else {
                println!("{line}");
            }
        }
        Some(_) => println!("record at least two nodes to generalize"),
        None => println!("no common selector"),
    }

    if tree {
        let highlights = Highlights {
            targets: session.store().resolved_nodes().collect(),
            matches: matches.into_iter().collect::<HashSet<_>>(),
            color,
        };
        print!("{}", render_tree(&page.dom, page.dom.root(), &highlights));
    }
    Ok(())
}
