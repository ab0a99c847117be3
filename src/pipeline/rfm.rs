//! RFM pipeline orchestration
//!
//! Runs Cleaner -> Enricher -> Aggregator -> Segmenter -> Classifier. Each
//! stage consumes the previous stage's output by reference and returns a new
//! value; global statistics (reference date, bin edges) are computed once and
//! carried explicitly in the result.

use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use super::aggregate::{aggregate, CustomerProfile, CustomerProfiles};
use super::category::{classify, CustomerCategory, RfmScore};
use super::cleaner::{clean, CleaningStats};
use super::enrich::enrich;
use super::error::{RfmError, RfmResult};
use super::quantile::{BinEdges, BinningPolicy, ClipBounds, LabelOrder, Score, FREQUENCY_FALLBACK_EDGES};
use super::transaction::Transaction;

/// Segmenter parameters for the three measures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentConfig {
    pub recency_clip: Option<ClipBounds>,
    pub frequency_clip: Option<ClipBounds>,
    pub monetary_clip: Option<ClipBounds>,
    /// Use the fixed Frequency edge table when quantile edges collide
    pub frequency_fallback: bool,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            recency_clip: None,
            frequency_clip: None,
            monetary_clip: None,
            frequency_fallback: true,
        }
    }
}

impl SegmentConfig {
    pub fn recency_policy(&self) -> BinningPolicy {
        BinningPolicy::new(LabelOrder::Descending).with_clip(self.recency_clip)
    }

    pub fn frequency_policy(&self) -> BinningPolicy {
        BinningPolicy::new(LabelOrder::Ascending)
            .with_clip(self.frequency_clip)
            .with_fallback(self.frequency_fallback.then_some(FREQUENCY_FALLBACK_EDGES))
    }

    pub fn monetary_policy(&self) -> BinningPolicy {
        BinningPolicy::new(LabelOrder::Ascending).with_clip(self.monetary_clip)
    }
}

/// A customer profile with its scores and category attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCustomer {
    #[serde(flatten)]
    pub profile: CustomerProfile,
    pub r_score: Score,
    pub f_score: Score,
    pub m_score: Score,
    pub rfm_score: RfmScore,
    pub category: CustomerCategory,
}

/// Fitted edges for each measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureBins {
    pub recency: BinEdges,
    pub frequency: BinEdges,
    pub monetary: BinEdges,
}

/// Customer count and mean measures for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: CustomerCategory,
    pub customers: usize,
    /// Percentage of scored customers
    pub share_pct: f64,
    pub mean_recency: f64,
    pub mean_frequency: f64,
    pub mean_monetary: Decimal,
}

/// Everything the pipeline hands to reporting.
#[derive(Debug, Clone, Serialize)]
pub struct RfmAnalysis {
    pub cleaning: CleaningStats,
    pub reference_date: Option<NaiveDateTime>,
    pub anonymous_lines: usize,
    pub anonymous_revenue: Decimal,
    pub total_revenue: Decimal,
    pub bins: MeasureBins,
    /// One entry per customer, ascending customer id
    pub customers: Vec<ScoredCustomer>,
    /// One entry per category, best first, empty categories included
    pub distribution: Vec<CategoryCount>,
}

/// Run the full pipeline on raw transactions.
pub fn run_rfm_pipeline(transactions: &[Transaction], config: &SegmentConfig) -> RfmResult<RfmAnalysis> {
    let cleaned = clean(transactions);
    let enriched = enrich(&cleaned)?;
    let profiles = aggregate(&enriched)?;
    let (bins, customers) = score_profiles(&profiles, config)?;
    let distribution = category_distribution(&customers);

    Ok(RfmAnalysis {
        cleaning: cleaned.stats,
        reference_date: profiles.reference_date,
        anonymous_lines: profiles.anonymous_lines,
        anonymous_revenue: profiles.anonymous_revenue,
        total_revenue: profiles.total_revenue,
        bins,
        customers,
        distribution,
    })
}

/// Fit edges on the full distribution of each measure, then score every profile.
pub fn score_profiles(
    profiles: &CustomerProfiles,
    config: &SegmentConfig,
) -> RfmResult<(MeasureBins, Vec<ScoredCustomer>)> {
    let recency: Vec<f64> = profiles.profiles.iter().map(|p| p.recency as f64).collect();
    let frequency: Vec<f64> = profiles.profiles.iter().map(|p| p.frequency as f64).collect();
    let monetary: Vec<f64> = profiles
        .profiles
        .iter()
        .map(|p| {
            p.monetary.to_f64().ok_or_else(|| {
                RfmError::InvariantViolation(format!(
                    "monetary total {} for customer {} is not representable as f64",
                    p.monetary, p.customer_id
                ))
            })
        })
        .collect::<RfmResult<_>>()?;

    let bins = MeasureBins {
        recency: config.recency_policy().fit(&recency),
        frequency: config.frequency_policy().fit(&frequency),
        monetary: config.monetary_policy().fit(&monetary),
    };

    let r_scores = bins.recency.assign_all(&recency);
    let f_scores = bins.frequency.assign_all(&frequency);
    let m_scores = bins.monetary.assign_all(&monetary);

    let customers = profiles
        .profiles
        .iter()
        .zip(r_scores.into_iter().zip(f_scores).zip(m_scores))
        .map(|(profile, ((r, f), m))| {
            let rfm_score = RfmScore::try_from(r.value() + f.value() + m.value())?;
            Ok(ScoredCustomer {
                profile: profile.clone(),
                r_score: r,
                f_score: f,
                m_score: m,
                rfm_score,
                category: classify(rfm_score),
            })
        })
        .collect::<RfmResult<Vec<_>>>()?;

    Ok((bins, customers))
}

/// Customers per category with mean measures, best category first.
pub fn category_distribution(customers: &[ScoredCustomer]) -> Vec<CategoryCount> {
    let total = customers.len();

    CustomerCategory::ALL
        .iter()
        .map(|&category| {
            let members: Vec<&ScoredCustomer> =
                customers.iter().filter(|c| c.category == category).collect();
            let n = members.len();

            let (mean_recency, mean_frequency, mean_monetary) = if n == 0 {
                (0.0, 0.0, Decimal::ZERO)
            } else {
                let recency: i64 = members.iter().map(|c| c.profile.recency).sum();
                let frequency: usize = members.iter().map(|c| c.profile.frequency).sum();
                let monetary: Decimal = members.iter().map(|c| c.profile.monetary).sum();
                (
                    recency as f64 / n as f64,
                    frequency as f64 / n as f64,
                    (monetary / Decimal::from(n)).round_dp(2),
                )
            };

            CategoryCount {
                category,
                customers: n,
                share_pct: if total > 0 { n as f64 / total as f64 * 100.0 } else { 0.0 },
                mean_recency,
                mean_frequency,
                mean_monetary,
            }
        })
        .collect()
}
