//! Monthly summary as delivered by the finance API, and the adapter that
//! turns it into the canonical shape the settlement engine works on.
//!
//! The API is loose about types: amounts may arrive as numbers, numeric
//! strings or `null`, and ids as integers or strings. Anything missing or
//! not a number is read as zero here.

use chrono::{Datelike, Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::balance::{CommonPayment, UserAllocation, UserId};

// =========================================================================
// Lenient field parsing
// =========================================================================

/// Read a monetary amount, treating anything that is not a finite number
/// (or a string holding one) as zero.
pub fn amount_from_value(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Read an identifier from an integer or a non-empty string.
pub fn id_from_value(value: &Value) -> Option<UserId> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(UserId::from(i))
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| UserId::from(f as i64))
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| UserId::new(trimmed))
        }
        _ => None,
    }
}

fn int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn lenient_amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(amount_from_value(&Value::deserialize(d)?))
}

fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<UserId>, D::Error> {
    Ok(id_from_value(&Value::deserialize(d)?))
}

fn lenient_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(int_from_value(&Value::deserialize(d)?))
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(text_from_value(&Value::deserialize(d)?))
}

/// A list whose elements are parsed one by one; elements that are not
/// objects are skipped, and a non-list value reads as an empty list.
fn lenient_list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(d)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!(value = %other, "Expected a list in monthly summary, ignoring");
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(error = %e, "Skipping malformed summary entry");
                None
            }
        })
        .collect())
}

// =========================================================================
// Wire shape
// =========================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAllocation {
    #[serde(default, deserialize_with = "lenient_id")]
    pub user_id: Option<UserId>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub income: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub alloc_quota: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPayer {
    #[serde(default, deserialize_with = "lenient_id")]
    pub user_id: Option<UserId>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCommonExpense {
    #[serde(default, deserialize_with = "lenient_int")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient_id")]
    pub owner_id: Option<UserId>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
}

/// Monthly summary exactly as the API sends it. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMonthlySummary {
    #[serde(default, deserialize_with = "lenient_int")]
    pub month: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub year: Option<i64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_expenses: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_common_expenses: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_income: f64,
    #[serde(default, deserialize_with = "lenient_list")]
    pub allocations: Vec<RawAllocation>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub common_payers: Vec<RawPayer>,
    /// Older name of `common_payers`, still sent by some API versions.
    #[serde(default, deserialize_with = "lenient_list")]
    pub paid_common_by: Vec<RawPayer>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub common_expenses_debug: Vec<RawCommonExpense>,
}

// =========================================================================
// Canonical shape
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    pub fn new(month: i64, year: i64) -> AppResult<Self> {
        let month = u32::try_from(month)
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| {
                AppError::Validation(format!("month must be between 1 and 12, got {}", month))
            })?;
        let year = i32::try_from(year)
            .ok()
            .filter(|y| NaiveDate::from_ymd_opt(*y, month, 1).is_some())
            .ok_or_else(|| AppError::Validation(format!("invalid year: {}", year)))?;
        Ok(Self { month, year })
    }

    /// "9/2025", the way the summary heading shows a period.
    pub fn label(&self) -> String {
        format!("{}/{}", self.month, self.year)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub total_expenses: f64,
    pub total_common_expenses: f64,
    pub total_income: f64,
}

/// One common expense from the API's diagnostic listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonExpenseEntry {
    pub id: Option<i64>,
    pub amount: f64,
    pub owner_id: Option<UserId>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
}

impl CommonExpenseEntry {
    /// An expense nobody is recorded as having paid.
    pub fn is_unattributed(&self) -> bool {
        self.owner_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub period: Period,
    pub totals: SummaryTotals,
    pub allocations: Vec<UserAllocation>,
    pub payments: Vec<CommonPayment>,
    pub common_expenses: Vec<CommonExpenseEntry>,
}

impl RawMonthlySummary {
    /// Resolve the wire shape into a [`MonthlySummary`]. A missing year
    /// means the current year.
    pub fn normalize(self) -> AppResult<MonthlySummary> {
        let current_year = i64::from(Local::now().year());
        self.normalize_with_default_year(current_year)
    }

    pub fn normalize_with_default_year(self, default_year: i64) -> AppResult<MonthlySummary> {
        let month = self
            .month
            .ok_or_else(|| AppError::Validation("monthly summary has no month".into()))?;
        let period = Period::new(month, self.year.unwrap_or(default_year))?;

        let allocations = self
            .allocations
            .into_iter()
            .filter_map(|raw| {
                let Some(user_id) = raw.user_id else {
                    warn!(name = ?raw.name, "Dropping allocation without user_id");
                    return None;
                };
                let name = raw.name.unwrap_or_else(|| user_id.fallback_name());
                Some(UserAllocation {
                    user_id,
                    name,
                    income: raw.income,
                    alloc_quota: raw.alloc_quota,
                })
            })
            .collect();

        let payers = if !self.common_payers.is_empty() {
            self.common_payers
        } else {
            if !self.paid_common_by.is_empty() {
                debug!("Using legacy paid_common_by field for common payments");
            }
            self.paid_common_by
        };

        let payments = payers
            .into_iter()
            .filter_map(|raw| {
                let Some(user_id) = raw.user_id else {
                    warn!(amount = raw.amount, "Dropping common payment without user_id");
                    return None;
                };
                Some(CommonPayment {
                    user_id,
                    name: raw.name,
                    amount: raw.amount,
                })
            })
            .collect();

        let common_expenses = self
            .common_expenses_debug
            .into_iter()
            .map(|raw| CommonExpenseEntry {
                id: raw.id,
                amount: raw.amount,
                owner_id: raw.owner_id,
                category: raw.category,
                date: raw.date.as_deref().and_then(parse_date),
            })
            .collect();

        Ok(MonthlySummary {
            period,
            totals: SummaryTotals {
                total_expenses: self.total_expenses,
                total_common_expenses: self.total_common_expenses,
                total_income: self.total_income,
            },
            allocations,
            payments,
            common_expenses,
        })
    }
}

/// Accepts a plain date or an ISO datetime, keeping only the date part.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let date_part = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Parse and normalize a monthly summary JSON document.
///
/// Only a syntactically broken document or a missing/invalid period is an
/// error; malformed fields read as zero.
pub fn parse_summary(json: &str) -> AppResult<MonthlySummary> {
    let raw: RawMonthlySummary = serde_json::from_str(json)?;
    raw.normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawMonthlySummary {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_amount_from_value() {
        assert_eq!(amount_from_value(&json!(12.5)), 12.5);
        assert_eq!(amount_from_value(&json!(3)), 3.0);
        assert_eq!(amount_from_value(&json!(" 7.25 ")), 7.25);
        assert_eq!(amount_from_value(&json!("abc")), 0.0);
        assert_eq!(amount_from_value(&json!("NaN")), 0.0);
        assert_eq!(amount_from_value(&json!(null)), 0.0);
        assert_eq!(amount_from_value(&json!(true)), 0.0);
        assert_eq!(amount_from_value(&json!({"value": 1})), 0.0);
    }

    #[test]
    fn test_id_from_value() {
        assert_eq!(id_from_value(&json!(4)), Some(UserId::from(4)));
        assert_eq!(id_from_value(&json!(4.0)), Some(UserId::from(4)));
        assert_eq!(id_from_value(&json!("u-1")), Some(UserId::from("u-1")));
        assert_eq!(id_from_value(&json!("  ")), None);
        assert_eq!(id_from_value(&json!(4.5)), None);
        assert_eq!(id_from_value(&json!(null)), None);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let summary = raw(json!({
            "month": 9,
            "year": 2025,
            "allocations": [{"user_id": 1, "name": "Alice"}]
        }))
        .normalize()
        .unwrap();

        assert_eq!(summary.totals, SummaryTotals::default());
        assert_eq!(summary.allocations[0].income, 0.0);
        assert_eq!(summary.allocations[0].alloc_quota, 0.0);
        assert!(summary.payments.is_empty());
    }

    #[test]
    fn test_prefers_common_payers_over_legacy_field() {
        let summary = raw(json!({
            "month": 1,
            "year": 2025,
            "common_payers": [{"user_id": 1, "amount": 10}],
            "paid_common_by": [{"user_id": 2, "amount": 99}]
        }))
        .normalize()
        .unwrap();

        assert_eq!(summary.payments.len(), 1);
        assert_eq!(summary.payments[0].user_id, UserId::from(1));
    }

    #[test]
    fn test_falls_back_to_legacy_field_when_common_payers_empty() {
        let summary = raw(json!({
            "month": 1,
            "year": 2025,
            "common_payers": [],
            "paid_common_by": [{"user_id": 2, "name": "Bob", "amount": "99.50"}]
        }))
        .normalize()
        .unwrap();

        assert_eq!(summary.payments.len(), 1);
        assert_eq!(summary.payments[0].amount, 99.5);
        assert_eq!(summary.payments[0].name.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_non_list_payers_reads_as_empty() {
        let summary = raw(json!({
            "month": 1,
            "year": 2025,
            "common_payers": "n/a",
            "paid_common_by": null
        }))
        .normalize()
        .unwrap();
        assert!(summary.payments.is_empty());
    }

    #[test]
    fn test_entries_without_user_id_are_dropped() {
        let summary = raw(json!({
            "month": 3,
            "year": 2025,
            "allocations": [{"name": "Ghost", "alloc_quota": 10}, {"user_id": 1}],
            "common_payers": [{"amount": 10}, 5, {"user_id": 1, "amount": 10}]
        }))
        .normalize()
        .unwrap();

        assert_eq!(summary.allocations.len(), 1);
        assert_eq!(summary.allocations[0].name, "User 1");
        assert_eq!(summary.payments.len(), 1);
    }

    #[test]
    fn test_missing_year_uses_default() {
        let summary = raw(json!({"month": "7"}))
            .normalize_with_default_year(2031)
            .unwrap();
        assert_eq!(summary.period, Period { month: 7, year: 2031 });
    }

    #[test]
    fn test_missing_or_invalid_month_is_rejected() {
        assert!(matches!(
            raw(json!({"year": 2025})).normalize(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            raw(json!({"month": 13, "year": 2025})).normalize(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            raw(json!({"month": 0, "year": 2025})).normalize(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_period_label() {
        assert_eq!(Period::new(9, 2025).unwrap().label(), "9/2025");
        assert_eq!(Period::new(12, 1999).unwrap().label(), "12/1999");
    }

    #[test]
    fn test_common_expense_debug_entries() {
        let summary = raw(json!({
            "month": 9,
            "year": 2025,
            "common_expenses_debug": [
                {"id": 1, "amount": 40.0, "owner_id": 1, "category": "Groceries", "date": "2025-09-03"},
                {"id": 2, "amount": 15.5, "owner_id": null, "date": "2025-09-10T00:00:00"}
            ]
        }))
        .normalize()
        .unwrap();

        let entries = &summary.common_expenses;
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_unattributed());
        assert_eq!(entries[0].category.as_deref(), Some("Groceries"));
        assert!(entries[1].is_unattributed());
        assert_eq!(entries[1].date, NaiveDate::from_ymd_opt(2025, 9, 10));
    }

    #[test]
    fn test_parse_summary_rejects_broken_json() {
        assert!(matches!(parse_summary("{not json"), Err(AppError::Json(_))));
    }
}
