//! Transaction records at each pipeline stage

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

/// Leading character marking a cancelled invoice
pub const CANCELLATION_MARKER: char = 'C';

/// A raw ledger row as supplied by the input collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub invoice_no: String,
    pub stock_code: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub unit_price: Decimal,
    /// `None` for anonymous/guest activity
    pub customer_id: Option<i64>,
    pub country: String,
    pub invoice_date: NaiveDateTime,
}

impl Transaction {
    /// Whether the invoice identifier denotes a cancellation (case-sensitive).
    pub fn is_cancellation(&self) -> bool {
        self.invoice_no.starts_with(CANCELLATION_MARKER)
    }
}

/// A transaction that passed every cleaning rule.
///
/// [`crate::pipeline::clean`] produces these with the description present and
/// quantity and unit price strictly positive. Fields stay public for fixtures,
/// so code building one by hand owns those conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanTransaction {
    pub invoice_no: String,
    pub stock_code: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub customer_id: Option<i64>,
    pub country: String,
    pub invoice_date: NaiveDateTime,
}

/// Calendar fields derived from an invoice timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarFields {
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub day: u32,
    /// 0 = Monday, 6 = Sunday
    pub day_of_week: u32,
    /// 0-23
    pub hour: u32,
}

/// A clean transaction with derived calendar fields and line amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTransaction {
    #[serde(flatten)]
    pub transaction: CleanTransaction,
    #[serde(flatten)]
    pub calendar: CalendarFields,
    /// quantity x unit price
    pub amount: Decimal,
}

impl EnrichedTransaction {
    pub fn customer_id(&self) -> Option<i64> {
        self.transaction.customer_id
    }

    pub fn invoice_no(&self) -> &str {
        &self.transaction.invoice_no
    }

    pub fn invoice_date(&self) -> NaiveDateTime {
        self.transaction.invoice_date
    }
}
