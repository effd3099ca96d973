use serde::Serialize;

use ferrocalc_core::{Calculator, RecordId};

use crate::cli::CalcArgs;
use crate::error::CliError;
use crate::output::EnvelopeError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct CalcResponseData<'a> {
    expression: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<RecordId>,
}

pub async fn run(args: &CalcArgs, calculator: &Calculator) -> Result<CommandResult, CliError> {
    match calculator.calculate(&args.expression).await {
        Ok(calculation) => {
            let data = serde_json::to_value(CalcResponseData {
                expression: &args.expression,
                result: Some(calculation.result),
                id: calculation.record_id,
            })?;
            Ok(CommandResult::ok(data).with_warnings(calculation.warnings))
        }
        Err(error) => {
            let data = serde_json::to_value(CalcResponseData {
                expression: &args.expression,
                result: None,
                id: None,
            })?;
            Ok(CommandResult::failed(
                data,
                EnvelopeError::new(error.code(), error.to_string()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ephemeral, run};

    #[tokio::test]
    async fn success_reports_result_and_record_id() {
        let envelope = run(&ephemeral(&["calc", "2+3*4"])).await.expect("run");

        assert_eq!(envelope.data["expression"], "2+3*4");
        assert_eq!(envelope.data["result"], "14");
        assert!(envelope.data["id"].is_string());
        assert!(envelope.warnings.is_empty());
        assert_eq!(envelope.exit_code(), 0);
    }

    #[tokio::test]
    async fn lex_error_keeps_expression_and_exits_with_three() {
        let envelope = run(&ephemeral(&["calc", "3+@"])).await.expect("run");

        assert_eq!(envelope.data["expression"], "3+@");
        assert!(envelope.data.get("result").is_none());
        assert!(envelope.data.get("id").is_none());
        assert_eq!(envelope.errors[0].code, "calc.lex_error");
        assert_eq!(envelope.exit_code(), 3);
    }
}
