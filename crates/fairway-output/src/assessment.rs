//! Bias assessment and debiasing suggestions.
//!
//! Compares the two disparities with a threshold. The suggestions are static
//! guidance; nothing here attempts to mitigate bias.

use fairway_metrics::DisparitySummary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Disparity above which bias is considered significant.
pub const DEFAULT_BIAS_THRESHOLD: f64 = 0.1;

/// Outcome of comparing disparities with the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasVerdict {
    /// At least one disparity exceeds the threshold
    Significant,
    /// Both disparities are defined and within the threshold
    Acceptable,
    /// No defined disparity exceeds the threshold, but one is undefined
    Inconclusive,
}

impl fmt::Display for BiasVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Significant => f.write_str("significant bias detected"),
            Self::Acceptable => f.write_str("acceptable fairness"),
            Self::Inconclusive => f.write_str("inconclusive"),
        }
    }
}

/// A generic debiasing technique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebiasingSuggestion {
    /// Technique name
    pub technique: String,
    /// What the technique does
    pub description: String,
}

impl DebiasingSuggestion {
    fn new(technique: &str, description: &str) -> Self {
        Self {
            technique: technique.to_string(),
            description: description.to_string(),
        }
    }
}

impl fmt::Display for DebiasingSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.technique, self.description)
    }
}

/// The fixed list of debiasing suggestions.
pub fn debiasing_suggestions() -> Vec<DebiasingSuggestion> {
    vec![
        DebiasingSuggestion::new("Preprocessing", "Normalize or balance group ratios."),
        DebiasingSuggestion::new("Reweighing", "Adjust training weights."),
        DebiasingSuggestion::new("Adversarial Debiasing", "Use debiasing networks."),
        DebiasingSuggestion::new("Post-processing", "Use fairness calibration."),
    ]
}

/// Verdict on a disparity summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasAssessment {
    /// Verdict
    pub verdict: BiasVerdict,
    /// Threshold the disparities were compared with
    pub threshold: f64,
    /// Names of the disparities above the threshold
    pub exceeded: Vec<String>,
    /// Suggestions, only present for a significant verdict
    pub suggestions: Vec<DebiasingSuggestion>,
}

impl BiasAssessment {
    /// Assess `summary` against `threshold`.
    ///
    /// A `NaN` disparity never exceeds the threshold.
    pub fn from_disparities(summary: &DisparitySummary, threshold: f64) -> Self {
        let exceeded: Vec<String> = [
            (
                "demographic_parity_difference",
                summary.demographic_parity_difference,
            ),
            (
                "equalized_odds_difference",
                summary.equalized_odds_difference,
            ),
        ]
        .into_iter()
        .filter(|(_, value)| value.abs() > threshold)
        .map(|(name, _)| name.to_string())
        .collect();

        let verdict = if !exceeded.is_empty() {
            BiasVerdict::Significant
        } else if summary.is_defined() {
            BiasVerdict::Acceptable
        } else {
            BiasVerdict::Inconclusive
        };

        let suggestions = if verdict == BiasVerdict::Significant {
            debiasing_suggestions()
        } else {
            Vec::new()
        };

        Self {
            verdict,
            threshold,
            exceeded,
            suggestions,
        }
    }

    /// Whether bias was found.
    pub fn is_significant(&self) -> bool {
        self.verdict == BiasVerdict::Significant
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        match self.verdict {
            BiasVerdict::Significant => {
                output.push_str(&format!(
                    "**Significant bias detected** ({} above {:.2}). Consider:\n\n",
                    self.exceeded.join(", "),
                    self.threshold
                ));
                for suggestion in &self.suggestions {
                    output.push_str(&format!(
                        "- **{}**: {}\n",
                        suggestion.technique, suggestion.description
                    ));
                }
            }
            BiasVerdict::Acceptable => {
                output.push_str("Metrics show acceptable fairness. No urgent debiasing needed.\n");
            }
            BiasVerdict::Inconclusive => {
                output.push_str(
                    "No defined disparity exceeds the threshold, but at least one disparity is \
                     undefined. See the undefined rates above.\n",
                );
            }
        }

        output
    }
}

impl fmt::Display for BiasAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Assessment: {} (threshold {:.2})", self.verdict, self.threshold)?;
        for suggestion in &self.suggestions {
            writeln!(f, "  - {suggestion}")?;
        }
        Ok(())
    }
}
