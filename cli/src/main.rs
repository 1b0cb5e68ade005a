//! Ownership CLI: command-line front end for the Ownership Explorer engine
//!
//! Loads the graph document from a file or URL, applies the selection flags
//! and prints one view of the result.

mod render;
mod source;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ownership_explorer::{ExplorerConfig, MatchMode, NodeId, Session, TopN};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ownership-cli", version, about = "Ownership network explorer CLI")]
struct Cli {
    /// Graph document: a file path or an http(s) URL
    #[arg(long, global = true, env = "OWNERSHIP_SOURCE", default_value = "graph.json")]
    source: String,

    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(flatten)]
    selection: SelectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Args)]
struct SelectionArgs {
    /// Company id to select (repeatable); defaults to the first company
    #[arg(long = "company", short = 'c', global = true)]
    companies: Vec<String>,

    /// Select every company
    #[arg(long, global = true, conflicts_with = "companies")]
    all_companies: bool,

    /// Shareholder id to show (repeatable); switches to manual mode
    #[arg(long = "shareholder", short = 's', global = true)]
    shareholders: Vec<String>,

    /// Shareholders kept in automatic mode: a positive number or "all"
    #[arg(long, global = true)]
    top_n: Option<TopN>,

    /// Minimum ownership percentage of a link
    #[arg(long, global = true)]
    min_percentage: Option<f64>,

    /// Merge group as NAME=ID,ID[,ID...] (repeatable)
    #[arg(long = "merge", global = true, value_parser = parse_merge)]
    merges: Vec<MergeArg>,

    /// Interpret search terms as regular expressions
    #[arg(long, global = true)]
    regex: bool,
}

#[derive(Clone)]
struct MergeArg {
    name: String,
    members: Vec<NodeId>,
}

fn parse_merge(value: &str) -> Result<MergeArg, String> {
    let (name, members) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=ID,ID, got {:?}", value))?;
    Ok(MergeArg {
        name: name.to_string(),
        members: members
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(NodeId::from)
            .collect(),
    })
}

#[derive(Clone, clap::ValueEnum)]
enum SearchKind {
    Companies,
    Shareholders,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the filtered (and merged) graph
    Graph,
    /// Print the shareholder rollup for the selected companies
    Rollup,
    /// Rank shareholders by how many selected companies they hold
    Top {
        /// Override the configured number of rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show details for a company, shareholder or merged node
    Details {
        id: String,
    },
    /// Search companies or rollup shareholders
    Search {
        term: String,

        #[arg(long, default_value = "shareholders")]
        kind: SearchKind,
    },
    /// Dataset and view statistics
    Stats,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            ExplorerConfig::from_yaml_str(&text)?
        }
        None => ExplorerConfig::default(),
    };
    if let Commands::Top { limit: Some(limit) } = &cli.command {
        config.top_influential_limit = (*limit).max(1);
    }

    let store = source::load(&cli.source).await?;
    let mut session = Session::new(Arc::new(store), config);
    apply_selection(&mut session, &cli.selection)?;

    let format = &cli.format;
    match &cli.command {
        Commands::Graph => render::graph(&session.view().graph, format)?,
        Commands::Rollup => render::rollup(&session.rollup(), format)?,
        Commands::Top { .. } => render::influential(&session.top_influential(), format)?,
        Commands::Details { id } => match session.details(id) {
            Some(details) => render::details(&details, format)?,
            None => anyhow::bail!("No company, shareholder or merged node with id {:?}", id),
        },
        Commands::Search { term, kind } => match kind {
            SearchKind::Companies => render::company_hits(&session, term, format)?,
            SearchKind::Shareholders => render::shareholder_hits(&session, term, format)?,
        },
        Commands::Stats => {
            let view = session.view();
            render::stats(&view.stats, session.store().dangling_link_count(), format)?
        }
    }

    Ok(())
}

fn apply_selection(session: &mut Session, args: &SelectionArgs) -> Result<()> {
    if args.all_companies {
        session.select_all_companies();
    } else if !args.companies.is_empty() {
        let selection = session.selection_mut();
        selection.clear_companies();
        for id in &args.companies {
            selection.select_company(id.as_str());
        }
    }

    let selection = session.selection_mut();
    for id in &args.shareholders {
        selection.select_shareholder(id.as_str());
    }
    if let Some(top_n) = args.top_n {
        selection.set_top_n(top_n);
    }
    if let Some(min) = args.min_percentage {
        selection.set_min_percentage(min);
    }
    selection.set_match_mode(MatchMode::from(args.regex));

    for merge in &args.merges {
        session
            .create_merge(&merge.name, merge.members.iter().cloned())
            .with_context(|| format!("Cannot create merge {:?}", merge.name))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ownership_explorer::{GraphStore, Link, Node};

    fn session() -> Session {
        let store = GraphStore::new(
            vec![
                Node::company("1", "A", "Alpha", 100.0),
                Node::company("2", "B", "Beta", 100.0),
                Node::shareholder("10", "X"),
            ],
            vec![Link::new("10", "1", 5.0, 5.0), Link::new("10", "2", 5.0, 5.0)],
        );
        Session::new(Arc::new(store), ExplorerConfig::default())
    }

    fn args(extra: &[&str]) -> SelectionArgs {
        let mut argv = vec!["ownership-cli"];
        argv.extend_from_slice(extra);
        argv.push("stats");
        Cli::try_parse_from(argv).unwrap().selection
    }

    #[test]
    fn test_repeated_flags_do_not_deselect() {
        let mut session = session();
        apply_selection(
            &mut session,
            &args(&["--company", "2", "--company", "2", "--shareholder", "10", "-s", "10"]),
        )
        .unwrap();

        let companies: Vec<&str> = session.selection().companies().iter().map(|c| c.as_str()).collect();
        assert_eq!(companies, vec!["2"]);
        assert_eq!(session.selection().shareholders().len(), 1);
    }

    #[test]
    fn test_merge_flag() {
        let merge = parse_merge("Funds=10, 11,").unwrap();
        assert_eq!(merge.name, "Funds");
        assert_eq!(merge.members, vec![NodeId::from("10"), NodeId::from("11")]);
        assert!(parse_merge("Funds").is_err());
    }
}
