//! Settlement of common expenses.
//!
//! Each member owes their allocation quota of the month's common expenses
//! and has actually paid some amount toward them. The difference is their
//! net position; debtors are then matched greedily against creditors to
//! produce a short list of transfers that evens everything out.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::models::{
    CommonExpenseEntry, CommonPayment, MismatchReport, MonthlySummary, Period, SummaryTotals,
    Transfer, UserAllocation, UserBalance, UserId,
};
use crate::money::{is_negligible, round2, EPSILON};

/// Build one balance per distinct user across allocations and payments.
///
/// Records appear in order of first appearance, allocations first. Users
/// that only show up in `payments` get a zero income and quota. Multiple
/// payments by the same user are summed.
pub fn build_balances(
    allocations: &[UserAllocation],
    payments: &[CommonPayment],
) -> Vec<UserBalance> {
    let mut balances: Vec<UserBalance> = Vec::with_capacity(allocations.len());
    let mut index: HashMap<UserId, usize> = HashMap::new();

    for alloc in allocations {
        if let Some(&i) = index.get(&alloc.user_id) {
            warn!(user_id = %alloc.user_id, "Duplicate allocation, merging into first record");
            balances[i].income += alloc.income;
            balances[i].alloc_quota += alloc.alloc_quota;
            continue;
        }
        index.insert(alloc.user_id.clone(), balances.len());
        balances.push(UserBalance {
            user_id: alloc.user_id.clone(),
            name: alloc.name.clone(),
            income: alloc.income,
            alloc_quota: alloc.alloc_quota,
            paid_common: 0.0,
            net: 0.0,
        });
    }

    for payment in payments {
        let i = match index.get(&payment.user_id) {
            Some(&i) => i,
            None => {
                debug!(user_id = %payment.user_id, "Payment from user without allocation");
                let name = payment
                    .name
                    .clone()
                    .unwrap_or_else(|| payment.user_id.fallback_name());
                index.insert(payment.user_id.clone(), balances.len());
                balances.push(UserBalance {
                    user_id: payment.user_id.clone(),
                    name,
                    income: 0.0,
                    alloc_quota: 0.0,
                    paid_common: 0.0,
                    net: 0.0,
                });
                balances.len() - 1
            }
        };
        balances[i].paid_common += payment.amount;
    }

    for balance in &mut balances {
        balance.net = round2(balance.paid_common - balance.alloc_quota);
    }

    balances
}

/// Working copy of a balance used while matching.
struct Position<'a> {
    balance: &'a UserBalance,
    remaining: f64,
}

/// Greedy settlement plan for `balances`.
///
/// Creditors are served largest first, debtors most-indebted first; ties
/// keep their input order. Nets within [`EPSILON`] of zero are treated as
/// settled. If the balances do not sum to zero the leftover stays
/// unsettled. The input is never modified.
pub fn compute_transfers(balances: &[UserBalance]) -> Vec<Transfer> {
    let mut creditors: Vec<Position> = balances
        .iter()
        .filter(|b| b.net > EPSILON)
        .map(|b| Position {
            balance: b,
            remaining: b.net,
        })
        .collect();
    let mut debtors: Vec<Position> = balances
        .iter()
        .filter(|b| b.net < -EPSILON)
        .map(|b| Position {
            balance: b,
            remaining: b.net,
        })
        .collect();

    // sort_by is stable
    creditors.sort_by(|a, b| b.remaining.total_cmp(&a.remaining));
    debtors.sort_by(|a, b| a.remaining.total_cmp(&b.remaining));

    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < debtors.len() && j < creditors.len() {
        let debtor = &mut debtors[i];
        let creditor = &mut creditors[j];
        let owe = debtor.remaining.abs().min(creditor.remaining);

        if owe.is_finite() && owe > EPSILON {
            let transfer = Transfer {
                from_id: debtor.balance.user_id.clone(),
                from: debtor.balance.name.clone(),
                to_id: creditor.balance.user_id.clone(),
                to: creditor.balance.name.clone(),
                amount: round2(owe),
            };
            debug!(
                from = %transfer.from,
                to = %transfer.to,
                amount = transfer.amount,
                "Suggested transfer"
            );
            transfers.push(transfer);
            debtor.remaining += owe;
            creditor.remaining -= owe;
        }

        let debtor_done = is_settled(debtor.remaining);
        let creditor_done = is_settled(creditor.remaining);
        if debtor_done {
            i += 1;
        }
        if creditor_done {
            j += 1;
        }
    }

    transfers
}

/// A position that can take no further part in matching. Non-finite
/// remainders count as settled so the loop always advances.
fn is_settled(remaining: f64) -> bool {
    !remaining.is_finite() || is_negligible(remaining)
}

/// Compare what was recorded as paid toward common expenses against the
/// month's common expense total.
pub fn detect_mismatch(total_common_payments: f64, total_common_expenses: f64) -> MismatchReport {
    let difference = total_common_payments - total_common_expenses;
    MismatchReport {
        total_common_payments,
        total_common_expenses,
        difference: round2(difference),
        mismatch: difference.abs() > EPSILON,
    }
}

/// Sum of all nets. Zero when payments and quotas reconcile.
pub fn residual(balances: &[UserBalance]) -> f64 {
    round2(balances.iter().map(|b| b.net).sum())
}

/// Copies of `balances` with every transfer applied: the payer's net goes
/// up by the amount, the recipient's goes down.
pub fn apply_transfers(balances: &[UserBalance], transfers: &[Transfer]) -> Vec<UserBalance> {
    let mut settled = balances.to_vec();
    let index: HashMap<&UserId, usize> = balances
        .iter()
        .enumerate()
        .map(|(i, b)| (&b.user_id, i))
        .collect();

    for transfer in transfers {
        if let Some(&i) = index.get(&transfer.from_id) {
            settled[i].net = round2(settled[i].net + transfer.amount);
        }
        if let Some(&i) = index.get(&transfer.to_id) {
            settled[i].net = round2(settled[i].net - transfer.amount);
        }
    }

    settled
}

/// Everything the summary page shows for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementReport {
    pub period: Period,
    pub totals: SummaryTotals,
    pub balances: Vec<UserBalance>,
    pub transfers: Vec<Transfer>,
    pub mismatch: MismatchReport,
    /// Sum of all nets; nonzero means some balance is left unsettled.
    pub residual: f64,
    /// Common expenses with no recorded payer.
    pub unattributed_expenses: Vec<CommonExpenseEntry>,
}

impl SettlementReport {
    pub fn is_balanced(&self) -> bool {
        is_negligible(self.residual)
    }

    pub fn unattributed_total(&self) -> f64 {
        round2(self.unattributed_expenses.iter().map(|e| e.amount).sum())
    }
}

/// Compute balances, transfers and diagnostics for a monthly summary.
pub fn settle(summary: &MonthlySummary) -> SettlementReport {
    let balances = build_balances(&summary.allocations, &summary.payments);
    let transfers = compute_transfers(&balances);

    let total_payments: f64 = summary.payments.iter().map(|p| p.amount).sum();
    let mismatch = detect_mismatch(total_payments, summary.totals.total_common_expenses);
    if mismatch.mismatch {
        warn!(
            period = %summary.period.label(),
            paid = mismatch.total_common_payments,
            expected = mismatch.total_common_expenses,
            "Recorded common payments do not match total common expenses"
        );
    }

    let residual = residual(&balances);
    if !is_negligible(residual) {
        warn!(residual, "Balances do not net to zero, some amount stays unsettled");
    }

    let unattributed_expenses: Vec<CommonExpenseEntry> = summary
        .common_expenses
        .iter()
        .filter(|e| e.is_unattributed())
        .cloned()
        .collect();

    debug!(
        users = balances.len(),
        transfers = transfers.len(),
        "Settlement computed"
    );

    SettlementReport {
        period: summary.period,
        totals: summary.totals,
        balances,
        transfers,
        mismatch,
        residual,
        unattributed_expenses,
    }
}
