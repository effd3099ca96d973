mod calc;
mod delete;
mod history;
mod rates;

use std::sync::Arc;
use std::time::Duration;

use ferrocalc_core::{
    Calculator, CalculatorConfig, EvalLimits, HistoryStore, InMemoryHistoryStore,
    InMemoryRateStore, RateCacheConfig, RateStore, StaticRateProvider,
};
use ferrocalc_warehouse::{Warehouse, WarehouseConfig};
use log::debug;
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::{Envelope, EnvelopeError};

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn failed(data: Value, error: EnvelopeError) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: vec![error],
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope, CliError> {
    let calculator = build_calculator(cli)?;

    let CommandResult {
        data,
        warnings,
        errors,
    } = match &cli.command {
        Command::Calc(args) => calc::run(args, &calculator).await?,
        Command::History(args) => history::run(args, &calculator).await?,
        Command::Delete(args) => delete::run(args, &calculator).await?,
        Command::Rates(args) => rates::run(args, &calculator).await?,
    };

    Ok(Envelope {
        data,
        warnings,
        errors,
    })
}

fn build_calculator(cli: &Cli) -> Result<Calculator, CliError> {
    let config = calculator_config(cli)?;
    let provider = Arc::new(StaticRateProvider::default());

    if cli.ephemeral {
        debug!("using in-memory stores");
        return Ok(Calculator::new(
            Arc::new(InMemoryHistoryStore::new()),
            Arc::new(InMemoryRateStore::new()),
            provider,
            config,
        ));
    }

    let mut warehouse_config = WarehouseConfig::default();
    if let Some(db_path) = &cli.db_path {
        warehouse_config.db_path = db_path.clone();
    }
    let warehouse = Warehouse::open(warehouse_config)?;
    let history: Arc<dyn HistoryStore> = Arc::new(warehouse.clone());
    let rates: Arc<dyn RateStore> = Arc::new(warehouse);

    Ok(Calculator::new(history, rates, provider, config))
}

fn calculator_config(cli: &Cli) -> Result<CalculatorConfig, CliError> {
    if !cli.max_magnitude.is_finite() || cli.max_magnitude <= 0.0 {
        return Err(CliError::InvalidArgument(format!(
            "--max-magnitude must be a positive finite number, got {}",
            cli.max_magnitude
        )));
    }

    let ttl_secs = cli.ttl_hours.checked_mul(60 * 60).ok_or_else(|| {
        CliError::InvalidArgument(format!("--ttl-hours {} is out of range", cli.ttl_hours))
    })?;

    Ok(CalculatorConfig {
        limits: EvalLimits {
            max_depth: cli.max_depth as usize,
            max_magnitude: cli.max_magnitude,
            ..EvalLimits::default()
        },
        rates: RateCacheConfig {
            ttl: Duration::from_secs(ttl_secs),
            ..RateCacheConfig::default()
        },
    })
}

#[cfg(test)]
fn ephemeral(args: &[&str]) -> Cli {
    use clap::Parser;

    let argv = ["ferrocalc", "--ephemeral"].into_iter().chain(args.iter().copied());
    Cli::try_parse_from(argv).expect("parse")
}
