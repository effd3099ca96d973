use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
///
/// Request-level failures (bad expressions, unavailable providers) are not
/// `CliError`s; they are reported in the envelope with exit code 3.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ferrocalc_core::ValidationError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Warehouse(#[from] ferrocalc_warehouse::WarehouseError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::InvalidArgument(_) => 2,
            Self::Serialization(_) => 4,
            Self::Warehouse(_) => 6,
            Self::Io(_) => 10,
        }
    }
}
