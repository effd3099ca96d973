use serde::Serialize;

use ferrocalc_core::{CalculationRecord, Calculator};

use crate::cli::HistoryArgs;
use crate::error::CliError;
use crate::output::EnvelopeError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct HistoryResponseData {
    records: Vec<CalculationRecord>,
}

pub async fn run(args: &HistoryArgs, calculator: &Calculator) -> Result<CommandResult, CliError> {
    match calculator.history(args.limit).await {
        Ok(records) => {
            let data = serde_json::to_value(HistoryResponseData { records })?;
            Ok(CommandResult::ok(data))
        }
        Err(error) => {
            let data = serde_json::to_value(HistoryResponseData {
                records: Vec::new(),
            })?;
            Ok(CommandResult::failed(
                data,
                EnvelopeError::new(error.code(), error.to_string()),
            ))
        }
    }
}
