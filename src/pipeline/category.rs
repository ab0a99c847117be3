//! Customer category classification from the combined RFM score

use serde::Serialize;

use super::error::{RfmError, RfmResult};
use super::quantile::Score;

/// Sum of the three ordinal scores, always in [3, 15].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RfmScore(u8);

impl RfmScore {
    pub const MIN: u8 = 3 * Score::MIN;
    pub const MAX: u8 = 3 * Score::MAX;

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RfmScore {
    type Error = RfmError;

    fn try_from(value: u8) -> RfmResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(RfmScore(value))
        } else {
            Err(RfmError::InvariantViolation(format!(
                "RFM score {} outside {}..={}",
                value,
                Self::MIN,
                Self::MAX
            )))
        }
    }
}

impl std::fmt::Display for RfmScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Customer segment, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CustomerCategory {
    #[serde(rename = "Champions")]
    Champions,
    #[serde(rename = "Loyal Customers")]
    LoyalCustomers,
    #[serde(rename = "Potential Loyalists")]
    PotentialLoyalists,
    #[serde(rename = "At Risk Customers")]
    AtRisk,
    #[serde(rename = "Need Attention")]
    NeedAttention,
}

impl CustomerCategory {
    /// Every category, best first.
    pub const ALL: [CustomerCategory; 5] = [
        CustomerCategory::Champions,
        CustomerCategory::LoyalCustomers,
        CustomerCategory::PotentialLoyalists,
        CustomerCategory::AtRisk,
        CustomerCategory::NeedAttention,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CustomerCategory::Champions => "Champions",
            CustomerCategory::LoyalCustomers => "Loyal Customers",
            CustomerCategory::PotentialLoyalists => "Potential Loyalists",
            CustomerCategory::AtRisk => "At Risk Customers",
            CustomerCategory::NeedAttention => "Need Attention",
        }
    }
}

impl std::fmt::Display for CustomerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Band lower bounds, highest first. The first band whose bound the score
/// reaches wins; the last bound equals `RfmScore::MIN` so every score matches.
pub const CATEGORY_BANDS: [(u8, CustomerCategory); 5] = [
    (13, CustomerCategory::Champions),
    (10, CustomerCategory::LoyalCustomers),
    (7, CustomerCategory::PotentialLoyalists),
    (5, CustomerCategory::AtRisk),
    (RfmScore::MIN, CustomerCategory::NeedAttention),
];

/// Map an RFM score to its category.
pub fn classify(score: RfmScore) -> CustomerCategory {
    CATEGORY_BANDS
        .iter()
        .find(|(lower, _)| score.value() >= *lower)
        .map(|(_, category)| *category)
        .unwrap_or(CustomerCategory::NeedAttention)
}

/// Classify a raw integer score, rejecting values outside [3, 15].
pub fn classify_value(value: u8) -> RfmResult<CustomerCategory> {
    RfmScore::try_from(value).map(classify)
}
