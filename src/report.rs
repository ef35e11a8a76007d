//! Plain-text rendering of a [`SettlementReport`] for the terminal.

use std::fmt::Write;

use crate::models::{Language, Settings};
use crate::services::settlement::SettlementReport;

#[derive(Debug, Clone, Copy)]
enum Label {
    Summary,
    TotalExpenses,
    CommonExpenses,
    TotalIncomes,
    User,
    Income,
    CommonShare,
    Paid,
    Net,
    Transfers,
    NoTransfers,
    Mismatch,
    Unsettled,
    Unattributed,
}

fn label(lang: Language, label: Label) -> &'static str {
    match (lang, label) {
        (Language::En, Label::Summary) => "Summary",
        (Language::En, Label::TotalExpenses) => "Total Expenses",
        (Language::En, Label::CommonExpenses) => "Common Expenses",
        (Language::En, Label::TotalIncomes) => "Total Incomes",
        (Language::En, Label::User) => "User",
        (Language::En, Label::Income) => "Income",
        (Language::En, Label::CommonShare) => "Common share",
        (Language::En, Label::Paid) => "Paid",
        (Language::En, Label::Net) => "Net",
        (Language::En, Label::Transfers) => "Suggested transfers",
        (Language::En, Label::NoTransfers) => "Everyone is settled up.",
        (Language::En, Label::Mismatch) => {
            "Warning: recorded common payments do not match common expenses"
        }
        (Language::En, Label::Unsettled) => "Left unsettled",
        (Language::En, Label::Unattributed) => "Common expenses without a payer",

        (Language::It, Label::Summary) => "Riepilogo",
        (Language::It, Label::TotalExpenses) => "Spese Totali",
        (Language::It, Label::CommonExpenses) => "Spese Comuni",
        (Language::It, Label::TotalIncomes) => "Redditi Totali",
        (Language::It, Label::User) => "Utente",
        (Language::It, Label::Income) => "Reddito",
        (Language::It, Label::CommonShare) => "Quota comune",
        (Language::It, Label::Paid) => "Pagato",
        (Language::It, Label::Net) => "Saldo",
        (Language::It, Label::Transfers) => "Trasferimenti suggeriti",
        (Language::It, Label::NoTransfers) => "Tutti i conti sono in pari.",
        (Language::It, Label::Mismatch) => {
            "Attenzione: i pagamenti comuni registrati non corrispondono alle spese comuni"
        }
        (Language::It, Label::Unsettled) => "Non saldato",
        (Language::It, Label::Unattributed) => "Spese comuni senza pagante",
    }
}

/// Render the report using the labels of the configured language.
pub fn render_text(report: &SettlementReport, settings: &Settings) -> String {
    let t = |l| label(settings.lang, l);
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "{} {}", t(Label::Summary), report.period.label());
    let _ = writeln!(
        out,
        "{}: {:.2}",
        t(Label::TotalExpenses),
        report.totals.total_expenses
    );
    let _ = writeln!(
        out,
        "{}: {:.2}",
        t(Label::CommonExpenses),
        report.totals.total_common_expenses
    );
    let _ = writeln!(
        out,
        "{}: {:.2}",
        t(Label::TotalIncomes),
        report.totals.total_income
    );
    out.push('\n');

    let name_width = report
        .balances
        .iter()
        .map(|b| b.name.chars().count())
        .chain(std::iter::once(t(Label::User).chars().count()))
        .max()
        .unwrap_or(0);

    let _ = writeln!(
        out,
        "{:<w$}  {:>12}  {:>12}  {:>12}  {:>12}",
        t(Label::User),
        t(Label::Income),
        t(Label::CommonShare),
        t(Label::Paid),
        t(Label::Net),
        w = name_width
    );
    for b in &report.balances {
        let _ = writeln!(
            out,
            "{:<w$}  {:>12.2}  {:>12.2}  {:>12.2}  {:>+12.2}",
            b.name,
            b.income,
            b.alloc_quota,
            b.paid_common,
            b.net,
            w = name_width
        );
    }
    out.push('\n');

    let _ = writeln!(out, "{}:", t(Label::Transfers));
    if report.transfers.is_empty() {
        let _ = writeln!(out, "  {}", t(Label::NoTransfers));
    }
    for transfer in &report.transfers {
        let _ = writeln!(
            out,
            "  {} -> {}: {:.2}",
            transfer.from, transfer.to, transfer.amount
        );
    }

    if report.mismatch.mismatch {
        let _ = writeln!(
            out,
            "\n{} ({:.2} / {:.2})",
            t(Label::Mismatch),
            report.mismatch.total_common_payments,
            report.mismatch.total_common_expenses
        );
    }
    if !report.unattributed_expenses.is_empty() {
        let _ = writeln!(
            out,
            "{}: {} ({:.2})",
            t(Label::Unattributed),
            report.unattributed_expenses.len(),
            report.unattributed_total()
        );
    }
    if !report.is_balanced() {
        let _ = writeln!(out, "{}: {:+.2}", t(Label::Unsettled), report.residual);
    }

    out
}
