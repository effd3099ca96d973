use serde::Serialize;

use ferrocalc_core::{Calculator, DeleteOutcome, RecordId};

use crate::cli::DeleteArgs;
use crate::error::CliError;
use crate::output::EnvelopeError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct DeleteResponseData {
    id: RecordId,
    deleted: bool,
}

pub async fn run(args: &DeleteArgs, calculator: &Calculator) -> Result<CommandResult, CliError> {
    let id = RecordId::parse(&args.id)?;

    match calculator.delete_calculation(id).await {
        Ok(DeleteOutcome::Found) => {
            let data = serde_json::to_value(DeleteResponseData { id, deleted: true })?;
            Ok(CommandResult::ok(data))
        }
        Ok(DeleteOutcome::NotFound) => {
            let data = serde_json::to_value(DeleteResponseData { id, deleted: false })?;
            Ok(CommandResult::failed(
                data,
                EnvelopeError::new("history.not_found", format!("calculation {id} not found")),
            ))
        }
        Err(error) => {
            let data = serde_json::to_value(DeleteResponseData { id, deleted: false })?;
            Ok(CommandResult::failed(
                data,
                EnvelopeError::new(error.code(), error.to_string()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{build_calculator, ephemeral, run};
    use super::run as delete;
    use crate::cli::Command;
    use ferrocalc_core::{RecordId, DEFAULT_HISTORY_LIMIT};

    #[tokio::test]
    async fn existing_record_is_reported_deleted() {
        let seed = ephemeral(&["history"]);
        let calculator = build_calculator(&seed).expect("calculator");
        let id = calculator
            .calculate("9/3")
            .await
            .expect("calculates")
            .record_id
            .expect("recorded");

        let id_text = id.to_string();
        let cli = ephemeral(&["delete", &id_text]);
        let Command::Delete(args) = &cli.command else {
            panic!("delete command");
        };
        let result = delete(args, &calculator).await.expect("delete");

        assert_eq!(result.data["id"], id_text.as_str());
        assert_eq!(result.data["deleted"], true);
        assert!(result.errors.is_empty());
        let remaining = calculator
            .history(DEFAULT_HISTORY_LIMIT)
            .await
            .expect("history");
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_and_exits_with_three() {
        let id = RecordId::generate().to_string();
        let envelope = run(&ephemeral(&["delete", &id])).await.expect("run");

        assert_eq!(envelope.data["deleted"], false);
        assert_eq!(envelope.errors[0].code, "history.not_found");
        assert_eq!(envelope.exit_code(), 3);
    }

    #[tokio::test]
    async fn malformed_id_is_a_validation_error() {
        let error = run(&ephemeral(&["delete", "not-a-uuid"]))
            .await
            .expect_err("must fail");

        assert_eq!(error.exit_code(), 2);
    }
}
