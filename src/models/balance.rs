use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a household member as reported by the API.
///
/// The API hands out integers, but string ids are accepted as well, so
/// both are normalized to their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display label used when the API provides no name.
    pub fn fallback_name(&self) -> String {
        format!("User {}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A user's share of the month's common expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAllocation {
    pub user_id: UserId,
    pub name: String,
    pub income: f64,
    pub alloc_quota: f64,
}

/// What a user actually paid toward common expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonPayment {
    pub user_id: UserId,
    pub name: Option<String>,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBalance {
    pub user_id: UserId,
    pub name: String,
    pub income: f64,
    pub alloc_quota: f64,
    pub paid_common: f64,
    /// `paid_common - alloc_quota` at currency precision. Positive means
    /// the user overpaid and is owed money.
    pub net: f64,
}

impl UserBalance {
    pub fn is_creditor(&self) -> bool {
        self.net > crate::money::EPSILON
    }

    pub fn is_debtor(&self) -> bool {
        self.net < -crate::money::EPSILON
    }
}

/// A suggested payment from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub from_id: UserId,
    pub from: String,
    pub to_id: UserId,
    pub to: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MismatchReport {
    pub total_common_payments: f64,
    pub total_common_expenses: f64,
    pub difference: f64,
    pub mismatch: bool,
}
