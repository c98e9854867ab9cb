use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mnemo", version, about = "Inspect and maintain mnemo embedding caches")]
pub struct Cli {
    /// Config file (defaults to the platform config dir, `mnemo/config.toml`)
    #[arg(long, env = "MNEMO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Memory repository root
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Embedding count, database location and journal mode
    Stats,
    /// Rank cached memories against a text query
    Search(SearchArgs),
    /// Print the cached record for a slug
    Show(SlugArgs),
    /// Remove cached embeddings
    Evict(EvictArgs),
    /// Embed files (slug = file stem), regenerating only stale entries
    Index(IndexArgs),
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    pub query: String,

    /// Maximum results; zero or negative uses the default of 10
    #[arg(short, long, default_value_t = 10, allow_negative_numbers = true)]
    pub limit: i64,

    /// Drop results scoring below this similarity
    #[arg(short, long)]
    pub threshold: Option<f32>,

    /// Slug that matched the query by keyword (repeatable); enables hybrid ranking
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SlugArgs {
    pub slug: String,
}

#[derive(Args, Debug)]
pub struct EvictArgs {
    #[arg(required = true)]
    pub slugs: Vec<String>,
}

#[derive(Args, Debug)]
pub struct IndexArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Map a signed CLI limit onto the library's `0 = default` convention.
pub fn limit_from_arg(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}
