//! CLI argument definitions for Ferrocalc.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `calc` | Evaluate an arithmetic expression |
//! | `history` | List recent calculations |
//! | `delete` | Delete a calculation by id |
//! | `rates` | Currency rates for a base currency |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--db-path` | `$FERROCALC_HOME/warehouse.duckdb` | Warehouse file |
//! | `--ephemeral` | `false` | Keep history and rates in memory only |
//! | `--max-depth` | `100` | Maximum expression nesting depth |
//! | `--max-magnitude` | `1e15` | Largest allowed power result |
//! | `--ttl-hours` | `24` | Rate snapshot freshness window |
//! | `-v` | off | Log verbosity, repeatable |
//!
//! # Examples
//!
//! ```bash
//! ferrocalc calc "2 + 3 * 4"
//! ferrocalc history --limit 10 --pretty
//! ferrocalc rates --base EUR --cache-mode refresh
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use ferrocalc_core::CacheMode;

/// Ferrocalc - arithmetic calculator with history and currency rates
#[derive(Debug, Parser)]
#[command(
    name = "ferrocalc",
    author,
    version,
    about = "Arithmetic calculator with persistent history and cached currency rates"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Path to the DuckDB warehouse file.
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Keep history and rate snapshots in memory for this invocation only.
    #[arg(long, global = true, default_value_t = false, conflicts_with = "db_path")]
    pub ephemeral: bool,

    /// Maximum nesting depth of parentheses and unary operators.
    #[arg(
        long,
        global = true,
        default_value_t = 100,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_depth: u32,

    /// Largest magnitude a power operation may produce.
    #[arg(long, global = true, default_value_t = 1e15)]
    pub max_magnitude: f64,

    /// Hours after which a stored rate snapshot is refreshed.
    #[arg(long, global = true, default_value_t = 24)]
    pub ttl_hours: u64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate an expression and record it in history.
    ///
    /// # Examples
    ///
    ///   ferrocalc calc "(2 + 3) * 4"
    ///   ferrocalc calc -- "-2 ^ 2"
    Calc(CalcArgs),

    /// List recent calculations, newest first.
    History(HistoryArgs),

    /// Delete one calculation from history.
    Delete(DeleteArgs),

    /// Fetch conversion rates relative to a base currency.
    ///
    /// # Examples
    ///
    ///   ferrocalc rates
    ///   ferrocalc rates --base jpy --cache-mode bypass
    Rates(RatesArgs),
}

/// Arguments for the `calc` command.
#[derive(Debug, Args)]
pub struct CalcArgs {
    /// Expression over numbers, + - * / ^ and parentheses.
    #[arg(allow_hyphen_values = true)]
    pub expression: String,
}

/// Arguments for the `history` command.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Maximum number of records to return.
    #[arg(long, default_value_t = ferrocalc_core::DEFAULT_HISTORY_LIMIT)]
    pub limit: usize,
}

/// Arguments for the `delete` command.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Identifier printed by `calc` or `history`.
    pub id: String,
}

/// Arguments for the `rates` command.
#[derive(Debug, Args)]
pub struct RatesArgs {
    /// Three-letter base currency code.
    #[arg(long, default_value = "USD")]
    pub base: String,

    /// How the stored snapshot is used.
    #[arg(long, value_enum, default_value_t = CacheModeArg::Use)]
    pub cache_mode: CacheModeArg,
}

/// Cache mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheModeArg {
    /// Serve a fresh stored snapshot, refreshing when stale.
    Use,
    /// Always refresh and store.
    Refresh,
    /// Always refresh, never touch the store.
    Bypass,
}

impl From<CacheModeArg> for CacheMode {
    fn from(value: CacheModeArg) -> Self {
        match value {
            CacheModeArg::Use => CacheMode::Use,
            CacheModeArg::Refresh => CacheMode::Refresh,
            CacheModeArg::Bypass => CacheMode::Bypass,
        }
    }
}
