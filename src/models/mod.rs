pub mod balance;
pub mod settings;
pub mod summary;

pub use balance::{CommonPayment, MismatchReport, Transfer, UserAllocation, UserBalance, UserId};
pub use settings::{Language, Settings, Theme};
pub use summary::{
    parse_summary, CommonExpenseEntry, MonthlySummary, Period, RawMonthlySummary, SummaryTotals,
};
