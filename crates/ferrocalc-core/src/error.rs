use thiserror::Error;

/// Validation and contract errors exposed by `ferrocalc-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("currency code cannot be empty")]
    EmptyCurrency,
    #[error("currency must be a 3-letter ISO code: '{value}'")]
    InvalidCurrency { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("record id must be a UUID: '{value}'")]
    InvalidRecordId { value: String },

    #[error("rate for '{currency}' must be finite and positive")]
    InvalidRate { currency: String },
    #[error("rate table for base '{base}' must map the base to exactly 1.0")]
    BaseNotUnit { base: String },
}

