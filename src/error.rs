use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AtmError>;

/// What happened to the account after cash could not be dispensed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The charge was reversed through the account charger.
    Refunded,
    /// The account stays charged until someone corrects it by hand.
    ManualReconciliationRequired,
}

impl fmt::Display for Reconciliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reconciliation::Refunded => f.write_str("charge refunded"),
            Reconciliation::ManualReconciliationRequired => {
                f.write_str("account still charged, manual reconciliation required")
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum AtmError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Card authorization refused")]
    AuthorizationRefused,
    #[error("Insufficient funds")]
    InsufficientFunds,
    #[error("Money depot could not release banknotes ({reconciliation})")]
    DispenseFailed { reconciliation: Reconciliation },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Collaborator error: {0}")]
    Collaborator(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AtmError {
    /// Short machine-readable name for the withdrawal outcome column.
    pub fn kind(&self) -> &'static str {
        match self {
            AtmError::InvalidAmount(_) => "invalid_amount",
            AtmError::AuthorizationRefused => "authorization_refused",
            AtmError::InsufficientFunds => "insufficient_funds",
            AtmError::DispenseFailed { .. } => "dispense_failed",
            AtmError::Config(_) => "config_error",
            AtmError::Collaborator(_) => "collaborator_error",
            AtmError::Csv(_) => "csv_error",
            AtmError::Io(_) => "io_error",
            AtmError::Json(_) => "json_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispense_failed_message() {
        let refunded = AtmError::DispenseFailed {
            reconciliation: Reconciliation::Refunded,
        };
        assert_eq!(
            refunded.to_string(),
            "Money depot could not release banknotes (charge refunded)"
        );

        let pending = AtmError::DispenseFailed {
            reconciliation: Reconciliation::ManualReconciliationRequired,
        };
        assert_eq!(
            pending.to_string(),
            "Money depot could not release banknotes (account still charged, manual reconciliation required)"
        );
    }
}
