//! Customer aggregation: one Recency/Frequency/Monetary row per customer

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::{RfmError, RfmResult};
use super::transaction::EnrichedTransaction;

/// Per-customer RFM measures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerProfile {
    pub customer_id: i64,
    /// Whole days between the dataset's last invoice and this customer's last invoice
    pub recency: i64,
    /// Distinct invoices
    pub frequency: usize,
    /// Sum of line amounts
    pub monetary: Decimal,
    pub last_purchase: NaiveDateTime,
}

/// Output of [`aggregate`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerProfiles {
    /// Sorted by ascending customer id
    pub profiles: Vec<CustomerProfile>,
    /// Max invoice timestamp over customer-bearing rows; `None` when there are none
    pub reference_date: Option<NaiveDateTime>,
    /// Lines without a customer id (excluded from every profile)
    pub anonymous_lines: usize,
    /// Revenue from lines without a customer id
    pub anonymous_revenue: Decimal,
    /// Revenue across all enriched lines
    pub total_revenue: Decimal,
}

impl CustomerProfiles {
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, customer_id: i64) -> Option<&CustomerProfile> {
        self.profiles
            .binary_search_by_key(&customer_id, |p| p.customer_id)
            .ok()
            .map(|idx| &self.profiles[idx])
    }
}

#[derive(Default)]
struct Accumulator<'a> {
    last_purchase: Option<NaiveDateTime>,
    invoices: HashSet<&'a str>,
    monetary: Decimal,
}

/// Collapse enriched transactions into customer profiles.
///
/// The reference date is computed once over the customer-bearing subset and
/// shared by every profile.
pub fn aggregate(transactions: &[EnrichedTransaction]) -> RfmResult<CustomerProfiles> {
    let mut by_customer: BTreeMap<i64, Accumulator<'_>> = BTreeMap::new();
    let mut anonymous_lines = 0usize;
    let mut anonymous_revenue = Decimal::ZERO;
    let mut total_revenue = Decimal::ZERO;

    for t in transactions {
        total_revenue = checked_total(total_revenue, t.amount, "total revenue")?;

        let Some(customer_id) = t.customer_id() else {
            anonymous_lines += 1;
            anonymous_revenue = checked_total(anonymous_revenue, t.amount, "anonymous revenue")?;
            continue;
        };

        let acc = by_customer.entry(customer_id).or_default();
        acc.last_purchase = Some(match acc.last_purchase {
            Some(prev) if prev >= t.invoice_date() => prev,
            _ => t.invoice_date(),
        });
        acc.invoices.insert(t.invoice_no());
        acc.monetary = acc.monetary.checked_add(t.amount).ok_or_else(|| {
            RfmError::Overflow(format!("monetary total of customer {} exceeds the decimal range", customer_id))
        })?;
    }

    let reference_date = by_customer.values().filter_map(|a| a.last_purchase).max();

    let profiles = match reference_date {
        Some(reference) => by_customer
            .into_iter()
            .filter_map(|(customer_id, acc)| {
                let last_purchase = acc.last_purchase?;
                Some(CustomerProfile {
                    customer_id,
                    recency: recency_days(reference, last_purchase),
                    frequency: acc.invoices.len(),
                    monetary: acc.monetary,
                    last_purchase,
                })
            })
            .collect(),
        None => Vec::new(),
    };

    Ok(CustomerProfiles {
        profiles,
        reference_date,
        anonymous_lines,
        anonymous_revenue,
        total_revenue,
    })
}

fn checked_total(total: Decimal, amount: Decimal, what: &str) -> RfmResult<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| RfmError::Overflow(format!("{} exceeds the decimal range", what)))
}

/// Whole days from `last_purchase` to `reference` (truncated).
pub fn recency_days(reference: NaiveDateTime, last_purchase: NaiveDateTime) -> i64 {
    (reference - last_purchase).num_days()
}
