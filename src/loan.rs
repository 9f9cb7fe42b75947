use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{PayoffError, Result};
use crate::types::{LoanId, OwnerId};

/// persisted loan record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub owner: OwnerId,
    pub name: String,
    pub balance: Money,
    pub rate: Rate,
    // derived from balance and rate, see `recompute_interest`
    monthly_interest: Money,
}

/// fields for a new loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLoan {
    pub name: String,
    pub balance: Money,
    pub rate: Rate,
}

/// partial edit of an existing loan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanUpdate {
    pub name: Option<String>,
    pub balance: Option<Money>,
    pub rate: Option<Rate>,
}

impl NewLoan {
    pub fn new(name: impl Into<String>, balance: Money, rate: Rate) -> Self {
        Self {
            name: name.into(),
            balance,
            rate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.name, self.balance, self.rate)
    }
}

impl Loan {
    /// build a loan record from validated fields
    pub fn open(id: LoanId, owner: OwnerId, new_loan: NewLoan) -> Result<Self> {
        new_loan.validate()?;
        let mut loan = Self {
            id,
            owner,
            name: new_loan.name.trim().to_string(),
            balance: new_loan.balance,
            rate: new_loan.rate,
            monthly_interest: Money::ZERO,
        };
        loan.recompute_interest();
        Ok(loan)
    }

    pub fn monthly_interest(&self) -> Money {
        self.monthly_interest
    }

    pub fn is_paid_off(&self) -> bool {
        !self.balance.is_positive()
    }

    fn recompute_interest(&mut self) {
        self.monthly_interest = self.balance.monthly_interest(self.rate);
    }

    /// apply an edit; nothing changes if the edited loan would be invalid
    pub fn apply_update(&mut self, update: LoanUpdate) -> Result<()> {
        let name = update.name.unwrap_or_else(|| self.name.clone());
        let balance = update.balance.unwrap_or(self.balance);
        let rate = update.rate.unwrap_or(self.rate);
        validate_fields(&name, balance, rate)?;

        self.name = name.trim().to_string();
        self.balance = balance;
        self.rate = rate;
        self.recompute_interest();
        Ok(())
    }

    /// record a real payment against the balance
    pub fn apply_payment(&mut self, amount: Money) -> Result<Money> {
        if !amount.is_positive() {
            return Err(PayoffError::validation("payment", "must be greater than zero"));
        }
        if amount > self.balance {
            return Err(PayoffError::PaymentExceedsBalance {
                balance: self.balance,
                payment: amount,
            });
        }

        self.balance -= amount;
        self.recompute_interest();
        Ok(self.balance)
    }

    /// add one month of interest to the balance
    pub fn accrue_month(&mut self) -> Money {
        let interest = self.monthly_interest;
        self.balance += interest;
        self.recompute_interest();
        interest
    }
}

fn validate_fields(name: &str, balance: Money, rate: Rate) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PayoffError::InvalidLoan {
            message: "Loan name is required".to_string(),
        });
    }
    if balance.is_negative() {
        return Err(PayoffError::InvalidLoan {
            message: "Balance cannot be negative".to_string(),
        });
    }
    if rate.is_negative() {
        return Err(PayoffError::InvalidLoan {
            message: "Interest rate cannot be negative".to_string(),
        });
    }
    Ok(())
}
