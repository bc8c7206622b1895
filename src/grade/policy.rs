#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, Category};

/// How an analysis turns into points.
///
/// Rubric entries are authored for a human grader and are never deducted
/// from automatically; a policy only looks at violation categories.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum GradingPolicy {
    /// no automatic score; every analyzed exercise awaits a human grader
    #[default]
    ManualReview,
    /// share of passing categories times the exercise's points, to one
    /// decimal
    CheckRatio,
    /// full points when valid, nothing otherwise
    AllOrNothing,
    /// full points minus a fixed cost per violation
    PerViolation {
        /// points withheld per violation
        cost: f64,
    },
}

/// Rounds to one decimal place.
fn one_decimal(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

impl GradingPolicy {
    /// Points awarded for `result` out of `max_points`, or `None` when the
    /// policy leaves the decision to a human. Always within `[0, max_points]`.
    pub fn score(&self, result: &AnalysisResult, max_points: f64) -> Option<f64> {
        let raw = match *self {
            GradingPolicy::ManualReview => return None,
            GradingPolicy::CheckRatio => {
                let passed = Category::ALL
                    .into_iter()
                    .filter(|c| result.count(*c) == 0)
                    .count();
                one_decimal(passed as f64 / Category::ALL.len() as f64 * max_points)
            }
            GradingPolicy::AllOrNothing => {
                if result.is_valid {
                    max_points
                } else {
                    0.0
                }
            }
            GradingPolicy::PerViolation { cost } => {
                max_points - cost * result.violation_count() as f64
            }
        };
        Some(raw.clamp(0.0, max_points.max(0.0)))
    }
}

impl fmt::Display for GradingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradingPolicy::ManualReview => f.write_str("manual"),
            GradingPolicy::CheckRatio => f.write_str("ratio"),
            GradingPolicy::AllOrNothing => f.write_str("all-or-nothing"),
            GradingPolicy::PerViolation { cost } => write!(f, "per-violation:{cost}"),
        }
    }
}

impl FromStr for GradingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "manual" | "manual-review" => Ok(GradingPolicy::ManualReview),
            "ratio" | "check-ratio" => Ok(GradingPolicy::CheckRatio),
            "all-or-nothing" => Ok(GradingPolicy::AllOrNothing),
            other => {
                let cost = other
                    .strip_prefix("per-violation:")
                    .ok_or_else(|| {
                        format!(
                            "unknown grading policy `{other}` (expected manual, ratio, \
                             all-or-nothing or per-violation:<cost>)"
                        )
                    })?
                    .parse::<f64>()
                    .map_err(|e| format!("invalid per-violation cost: {e}"))?;
                if cost.is_finite() && cost >= 0.0 {
                    Ok(GradingPolicy::PerViolation { cost })
                } else {
                    Err(format!("per-violation cost must be a non-negative number, got {cost}"))
                }
            }
        }
    }
}
