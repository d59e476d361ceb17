use coinstreak_core::CoreError;
use coinstreak_warehouse::WarehouseError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] coinstreak_core::ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Core(error) => match error {
                CoreError::Validation(_) => 2,
                CoreError::Fetch(_) | CoreError::CurrencyNotFound { .. } | CoreError::CurrencyPayload { .. } => 3,
                CoreError::NoData { .. } => 4,
                CoreError::Warehouse(_) | CoreError::CorruptRecord { .. } => 5,
                CoreError::Serialization(_) => 6,
                CoreError::Io(_) => 10,
            },
            Self::Warehouse(_) => 5,
            Self::Serialization(_) => 6,
            Self::Io(_) => 10,
        }
    }
}
