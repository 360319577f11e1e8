use std::fmt;

use thiserror::Error;

/// Boxed error returned by a gateway implementation.
pub type GatewayError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    /// Writing the "Average Moving" header into a new column.
    Header,
    /// Writing the computed values.
    Values,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteStage::Header => write!(f, "add a new column"),
            WriteStage::Values => write!(f, "write the Average Moving values"),
        }
    }
}

/// Every way a run can fail. All are terminal for the run.
#[derive(Debug, Error)]
pub enum AverageMovingError {
    #[error("Something went wrong when trying to get the Spreadsheet!")]
    SpreadsheetUnavailable {
        #[source]
        source: GatewayError,
    },

    #[error("Something went wrong when trying to get the Spreadsheet values!")]
    Fetch {
        #[source]
        source: GatewayError,
    },

    #[error("No necessary data found!")]
    InsufficientData { rows: usize },

    #[error("{column} column not found!")]
    MissingColumn { column: String },

    #[error("Something went wrong when trying to {stage}!")]
    Write {
        stage: WriteStage,
        range: String,
        #[source]
        source: GatewayError,
    },
}

impl AverageMovingError {
    /// The top-level message followed by each underlying cause, `: `-joined.
    pub fn chain_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }

    /// True for failures detected locally, before any write was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AverageMovingError::InsufficientData { .. } | AverageMovingError::MissingColumn { .. }
        )
    }
}
