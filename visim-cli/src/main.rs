use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use visim::{Orchestrator, ScoredMatch, SearchRequest};

#[derive(Parser, Debug)]
#[command(author, version, about = "Rank images in a folder by visual similarity to a query")]
struct Cli {
    /// Query image path.
    query: PathBuf,
    /// Directory of candidate images.
    candidates: PathBuf,
    /// Number of results to return.
    #[arg(short = 'n', long, default_value_t = 9)]
    top_n: usize,
    /// Write JSON results to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Enable tracing output for diagnostics.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    score: f32,
    path: String,
}

impl From<ScoredMatch> for MatchRecord {
    fn from(value: ScoredMatch) -> Self {
        Self {
            score: value.score,
            path: value.path.display().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    query: String,
    matches: Vec<MatchRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("visim=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.top_n == 0 {
        return Err("top-n must be at least 1".into());
    }

    let mut orchestrator = Orchestrator::new();
    let handle = orchestrator.start(SearchRequest {
        query_path: cli.query.clone(),
        candidate_dir: cli.candidates.clone(),
        top_n: cli.top_n,
    })?;
    let ranking = handle.wait()?;

    let output = Output {
        query: cli.query.display().to_string(),
        matches: ranking.into_iter().map(MatchRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match cli.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
