//! Transaction cleaning: drops cancellations, returns and undescribed rows

use rust_decimal::Decimal;
use serde::Serialize;

use super::transaction::{CleanTransaction, Transaction};

/// Row counts observed while cleaning.
///
/// `negative_quantity` and `cancellations` are informational. They are
/// counted after rows without a description are dropped and before the
/// cancellation/quantity/price filter runs, and they play no part in
/// deciding which rows survive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningStats {
    /// Rows handed to the cleaner
    pub raw_rows: usize,
    /// Rows dropped because the description was missing
    pub missing_description: usize,
    /// Rows with quantity < 0 (likely returns)
    pub negative_quantity: usize,
    /// Rows whose invoice starts with the cancellation marker
    pub cancellations: usize,
    /// Rows in the clean set
    pub clean_rows: usize,
}

/// Output of [`clean`]: the analysis-ready rows plus observation counts.
#[derive(Debug, Clone, Default)]
pub struct CleanTransactions {
    pub transactions: Vec<CleanTransaction>,
    pub stats: CleaningStats,
}

impl CleanTransactions {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Filter raw transactions into the clean set.
///
/// Never fails: an empty or fully filtered result is valid output. The
/// input slice is left untouched; surviving rows are copied out.
pub fn clean(transactions: &[Transaction]) -> CleanTransactions {
    let mut stats = CleaningStats {
        raw_rows: transactions.len(),
        ..Default::default()
    };

    let described: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.description.is_some())
        .collect();
    stats.missing_description = transactions.len() - described.len();

    stats.negative_quantity = described.iter().filter(|t| t.quantity < 0).count();
    stats.cancellations = described.iter().filter(|t| t.is_cancellation()).count();

    let clean: Vec<CleanTransaction> = described
        .into_iter()
        .filter(|t| !t.is_cancellation() && t.quantity > 0 && t.unit_price > Decimal::ZERO)
        .filter_map(to_clean)
        .collect();
    stats.clean_rows = clean.len();

    CleanTransactions {
        transactions: clean,
        stats,
    }
}

fn to_clean(t: &Transaction) -> Option<CleanTransaction> {
    Some(CleanTransaction {
        invoice_no: t.invoice_no.clone(),
        stock_code: t.stock_code.clone(),
        description: t.description.clone()?,
        quantity: t.quantity,
        unit_price: t.unit_price,
        customer_id: t.customer_id,
        country: t.country.clone(),
        invoice_date: t.invoice_date,
    })
}
