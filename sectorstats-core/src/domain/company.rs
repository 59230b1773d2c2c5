//! Company roster: the ordered list of tracked companies.
//!
//! Roster order is significant: stats rows and chart series follow it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RosterError {
    #[error("company roster is empty")]
    Empty,

    #[error("company '{0}' is listed more than once")]
    DuplicateName(String),

    #[error("company '{0}' has an empty symbol")]
    EmptySymbol(String),
}

/// A tracked company and its exchange ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub symbol: String,
}

impl Company {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// Indian IT majors on the NSE.
pub fn default_roster() -> Vec<Company> {
    [
        ("HCL", "HCLTECH.NS"),
        ("Infosys", "INFY.NS"),
        ("TCS", "TCS.NS"),
        ("Wipro", "WIPRO.NS"),
    ]
    .into_iter()
    .map(|(name, symbol)| Company::new(name, symbol))
    .collect()
}

/// Reject empty rosters, blank symbols and repeated names.
pub fn validate_roster(companies: &[Company]) -> Result<(), RosterError> {
    if companies.is_empty() {
        return Err(RosterError::Empty);
    }
    for (i, c) in companies.iter().enumerate() {
        if c.symbol.trim().is_empty() {
            return Err(RosterError::EmptySymbol(c.name.clone()));
        }
        if companies[..i].iter().any(|prev| prev.name == c.name) {
            return Err(RosterError::DuplicateName(c.name.clone()));
        }
    }
    Ok(())
}
