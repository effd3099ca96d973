use serde::Serialize;

use ferrocalc_core::{Calculator, CurrencyCode, RateTable, UtcDateTime};

use crate::cli::RatesArgs;
use crate::error::CliError;
use crate::output::EnvelopeError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct RatesResponseData<'a> {
    base: &'a CurrencyCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    rates: Option<&'a RateTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fetched_at: Option<UtcDateTime>,
    cache_hit: bool,
}

pub async fn run(args: &RatesArgs, calculator: &Calculator) -> Result<CommandResult, CliError> {
    let base = CurrencyCode::parse(&args.base)?;

    match calculator
        .get_rates_with_mode(&base, args.cache_mode.into())
        .await
    {
        Ok(lookup) => {
            let data = serde_json::to_value(RatesResponseData {
                base: lookup.snapshot.base(),
                rates: Some(lookup.snapshot.rates()),
                fetched_at: Some(lookup.snapshot.fetched_at()),
                cache_hit: lookup.cache_hit,
            })?;
            Ok(CommandResult::ok(data).with_warnings(lookup.warnings))
        }
        Err(error) => {
            let data = serde_json::to_value(RatesResponseData {
                base: &base,
                rates: None,
                fetched_at: None,
                cache_hit: false,
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
    async fn default_base_is_usd_with_the_full_table() {
        let envelope = run(&ephemeral(&["rates"])).await.expect("run");

        assert_eq!(envelope.data["base"], "USD");
        assert_eq!(envelope.data["rates"]["USD"], 1.0);
        assert_eq!(envelope.data["rates"]["EUR"], 0.93);
        assert!(envelope.data["fetched_at"].is_string());
        assert_eq!(envelope.data["cache_hit"], false);
        assert_eq!(envelope.exit_code(), 0);
    }

    #[tokio::test]
    async fn unquoted_base_is_unknown_and_exits_with_three() {
        let envelope = run(&ephemeral(&["rates", "--base", "chf"]))
            .await
            .expect("run");

        assert_eq!(envelope.data["base"], "CHF");
        assert!(envelope.data.get("rates").is_none());
        assert_eq!(envelope.errors[0].code, "rates.unknown_currency");
        assert_eq!(envelope.exit_code(), 3);
    }

    #[tokio::test]
    async fn malformed_base_is_a_validation_error() {
        let error = run(&ephemeral(&["rates", "--base", "US"]))
            .await
            .expect_err("must fail");

        assert_eq!(error.exit_code(), 2);
    }
}
