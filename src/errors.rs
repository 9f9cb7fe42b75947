use thiserror::Error;

use crate::decimal::Money;
use crate::types::{LoanId, OwnerId, Strategy};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayoffError {
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    #[error("payment of {payment} cannot cover minimum interest of {owed} in month {month}, period {period}")]
    InsufficientFunds {
        month: u32,
        period: u32,
        payment: Money,
        owed: Money,
    },

    #[error("strategy not yet supported: {strategy}")]
    UnsupportedStrategy {
        strategy: Strategy,
    },

    #[error("no loans to simulate for owner {owner}")]
    EmptyWorkingSet {
        owner: OwnerId,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("invalid loan: {message}")]
    InvalidLoan {
        message: String,
    },

    #[error("payment exceeds balance: balance {balance}, payment {payment}")]
    PaymentExceedsBalance {
        balance: Money,
        payment: Money,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("storage error: {message}")]
    Storage {
        message: String,
    },

    #[error("{reason}")]
    SignUp {
        reason: &'static str,
    },

    #[error("{reason}")]
    LogIn {
        reason: &'static str,
    },
}

impl PayoffError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        PayoffError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// user-facing message for the caller to flash back
    pub fn user_message(&self) -> String {
        match self {
            PayoffError::Validation { field, .. } => format!("Enter a valid {}", field),
            PayoffError::InsufficientFunds { .. } => {
                "Payment is too low to cover the minimum interest on your loans".to_string()
            }
            PayoffError::UnsupportedStrategy { strategy } => {
                format!("The {} strategy is not supported yet", strategy)
            }
            PayoffError::EmptyWorkingSet { .. } => "Add a loan before running a simulation".to_string(),
            PayoffError::LoanNotFound { .. } => "Loan not found".to_string(),
            PayoffError::PaymentExceedsBalance { .. } => "Payment is larger than the loan balance".to_string(),
            PayoffError::InvalidLoan { message } => message.clone(),
            PayoffError::SignUp { reason } | PayoffError::LogIn { reason } => reason.to_string(),
            PayoffError::InvalidConfiguration { .. } | PayoffError::Storage { .. } => {
                "Something went wrong, please try again".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for PayoffError {
    fn from(e: serde_json::Error) -> Self {
        PayoffError::InvalidConfiguration {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PayoffError>;
