//! Feature enrichment: calendar fields and line amounts

use chrono::{Datelike, NaiveDateTime, Timelike};
use rust_decimal::Decimal;

use super::cleaner::CleanTransactions;
use super::error::{RfmError, RfmResult};
use super::transaction::{CalendarFields, CleanTransaction, EnrichedTransaction};

/// Decompose a naive timestamp into calendar fields. No timezone handling.
pub fn calendar_fields(ts: &NaiveDateTime) -> CalendarFields {
    CalendarFields {
        year: ts.year(),
        month: ts.month(),
        day: ts.day(),
        day_of_week: ts.weekday().num_days_from_monday(),
        hour: ts.hour(),
    }
}

/// Line amount in exact decimal arithmetic. Fails instead of wrapping when
/// the product leaves the decimal range.
pub fn line_amount(quantity: i64, unit_price: Decimal) -> RfmResult<Decimal> {
    Decimal::from(quantity).checked_mul(unit_price).ok_or_else(|| {
        RfmError::Overflow(format!("line amount {} x {} exceeds the decimal range", quantity, unit_price))
    })
}

/// Enrich a single clean transaction.
pub fn enrich_one(transaction: CleanTransaction) -> RfmResult<EnrichedTransaction> {
    let calendar = calendar_fields(&transaction.invoice_date);
    let amount = line_amount(transaction.quantity, transaction.unit_price)?;
    Ok(EnrichedTransaction {
        transaction,
        calendar,
        amount,
    })
}

/// Enrich every clean transaction, preserving input order.
pub fn enrich(clean: &CleanTransactions) -> RfmResult<Vec<EnrichedTransaction>> {
    clean
        .transactions
        .iter()
        .cloned()
        .map(enrich_one)
        .collect()
}
