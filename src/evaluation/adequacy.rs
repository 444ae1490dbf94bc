//! Additive penalty scores for residual quality and overall model adequacy.
//!
//! Both scores are reading aids built from fixed penalties and tiers. They are
//! not statistical tests.

use crate::evaluation::fit::FitStatistics;
use crate::evaluation::residuals::{BasicStatistics, NormalityTests, RESIDUAL_ALPHA};
use crate::validation::LjungBoxResult;
use serde::Serialize;
use std::fmt;

const PENALTY_MEAN_OFFSET: u32 = 10;
const PENALTY_NON_NORMAL: u32 = 15;
const PENALTY_AUTOCORRELATED: u32 = 20;
const PENALTY_SKEWED: u32 = 10;
const PENALTY_KURTOSIS: u32 = 10;

/// A residual problem detected while scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidualIssue {
    MeanOffset,
    NonNormal,
    Autocorrelated,
    Skewed,
    AbnormalKurtosis,
}

impl fmt::Display for ResidualIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ResidualIssue::MeanOffset => "residual mean deviates from zero",
            ResidualIssue::NonNormal => "residuals are not normally distributed",
            ResidualIssue::Autocorrelated => "residuals are autocorrelated",
            ResidualIssue::Skewed => "residual skewness is large",
            ResidualIssue::AbnormalKurtosis => "residual kurtosis is abnormal",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdequacyLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl AdequacyLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => AdequacyLevel::Excellent,
            75..=89 => AdequacyLevel::Good,
            60..=74 => AdequacyLevel::Fair,
            _ => AdequacyLevel::Poor,
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            AdequacyLevel::Excellent => "model fits well; residuals are consistent with white noise",
            AdequacyLevel::Good => "model fits reasonably well with minor residual issues",
            AdequacyLevel::Fair => "model fit is mediocre; consider adjusting the order",
            AdequacyLevel::Poor => "model fits poorly; choose a different order",
        }
    }
}

impl fmt::Display for AdequacyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AdequacyLevel::Excellent => "excellent",
            AdequacyLevel::Good => "good",
            AdequacyLevel::Fair => "fair",
            AdequacyLevel::Poor => "poor",
        };
        f.write_str(text)
    }
}

/// Per-criterion pass flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdequacyChecks {
    pub mean_centered: bool,
    pub normal_distribution: bool,
    pub no_autocorrelation: bool,
    pub reasonable_skewness: bool,
    pub reasonable_kurtosis: bool,
}

/// Residual score out of 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdequacyScore {
    pub score: u32,
    pub level: AdequacyLevel,
    pub recommendation: String,
    pub issues: Vec<ResidualIssue>,
    pub checks: AdequacyChecks,
}

/// Score residuals starting from 100.
///
/// Normality is judged by Jarque-Bera and autocorrelation by Ljung-Box at
/// the largest lag. A test that did not run costs nothing but does not count
/// as passed in `checks`, and the recommendation names it as not checked.
pub fn score_adequacy(
    basic: &BasicStatistics,
    normality: &NormalityTests,
    autocorrelation: Option<&LjungBoxResult>,
) -> AdequacyScore {
    let mean_centered = basic.mean.abs() <= 0.1 * basic.std;
    let normal = normality.jarque_bera.as_ref().map(|t| t.is_normal);
    let white = autocorrelation.map(|lb| lb.is_white_noise(RESIDUAL_ALPHA));
    let reasonable_skewness = basic.skewness.abs() <= 1.0;
    let reasonable_kurtosis = basic.kurtosis.abs() <= 3.0;

    let mut issues = Vec::new();
    let mut penalty = 0;
    if !mean_centered {
        issues.push(ResidualIssue::MeanOffset);
        penalty += PENALTY_MEAN_OFFSET;
    }
    if normal == Some(false) {
        issues.push(ResidualIssue::NonNormal);
        penalty += PENALTY_NON_NORMAL;
    }
    if white == Some(false) {
        issues.push(ResidualIssue::Autocorrelated);
        penalty += PENALTY_AUTOCORRELATED;
    }
    if !reasonable_skewness {
        issues.push(ResidualIssue::Skewed);
        penalty += PENALTY_SKEWED;
    }
    if !reasonable_kurtosis {
        issues.push(ResidualIssue::AbnormalKurtosis);
        penalty += PENALTY_KURTOSIS;
    }

    let score = 100 - penalty;
    let level = AdequacyLevel::from_score(score);
    let mut recommendation = level.recommendation().to_string();
    let skipped: Vec<&str> = [(normal, "normality"), (white, "autocorrelation")]
        .into_iter()
        .filter_map(|(outcome, name)| outcome.is_none().then_some(name))
        .collect();
    if !skipped.is_empty() {
        recommendation.push_str(&format!(" (not checked: {})", skipped.join(", ")));
    }
    AdequacyScore {
        score,
        level,
        recommendation,
        issues,
        checks: AdequacyChecks {
            mean_centered,
            normal_distribution: normal.unwrap_or(false),
            no_autocorrelation: white.unwrap_or(false),
            reasonable_skewness,
            reasonable_kurtosis,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelAdequacyLevel {
    High,
    Medium,
    Fair,
    Low,
}

impl ModelAdequacyLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            85.. => ModelAdequacyLevel::High,
            70..=84 => ModelAdequacyLevel::Medium,
            55..=69 => ModelAdequacyLevel::Fair,
            _ => ModelAdequacyLevel::Low,
        }
    }

    pub fn interpretation(&self) -> &'static str {
        match self {
            ModelAdequacyLevel::High => "the model suits the data very well",
            ModelAdequacyLevel::Medium => "the model fits the data well",
            ModelAdequacyLevel::Fair => "the model fits the data with room for improvement",
            ModelAdequacyLevel::Low => "the model fits poorly; consider another order",
        }
    }
}

impl fmt::Display for ModelAdequacyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ModelAdequacyLevel::High => "high",
            ModelAdequacyLevel::Medium => "medium",
            ModelAdequacyLevel::Fair => "fair",
            ModelAdequacyLevel::Low => "low",
        };
        f.write_str(text)
    }
}

/// Composite adequacy of a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelAdequacy {
    pub score: u32,
    pub level: ModelAdequacyLevel,
    pub interpretation: String,
}

fn r_squared_points(r2: f64) -> u32 {
    if r2 > 0.8 {
        20
    } else if r2 > 0.6 {
        15
    } else if r2 > 0.4 {
        10
    } else {
        5
    }
}

/// `20 + R^2 tier + floor(0.6 * residual score)`, capped at 100.
pub fn assess_model_adequacy(fit: &FitStatistics, residual: Option<&AdequacyScore>) -> ModelAdequacy {
    let residual_points = residual.map_or(0, |r| r.score * 6 / 10);
    let score = (20 + r_squared_points(fit.r_squared) + residual_points).min(100);
    let level = ModelAdequacyLevel::from_score(score);
    ModelAdequacy {
        score,
        level,
        interpretation: level.interpretation().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{LjungBoxLag, NormalityTest};

    fn basic(mean: f64, std: f64, skewness: f64, kurtosis: f64) -> BasicStatistics {
        BasicStatistics {
            mean,
            std,
            min: -3.0,
            max: 3.0,
            skewness,
            kurtosis,
            n_observations: 100,
        }
    }

    fn normality(is_normal: bool) -> NormalityTests {
        NormalityTests {
            jarque_bera: Some(NormalityTest {
                statistic: 1.0,
                p_value: if is_normal { 0.5 } else { 0.001 },
                is_normal,
            }),
            shapiro_wilk: None,
        }
    }

    fn ljung_box(p_value: f64) -> LjungBoxResult {
        LjungBoxResult {
            statistic: 5.0,
            p_value,
            max_lag: 10,
            df: 10,
            table: vec![LjungBoxLag {
                lag: 10,
                statistic: 5.0,
                p_value,
            }],
        }
    }

    fn fit(r_squared: f64) -> FitStatistics {
        FitStatistics {
            aic: 0.0,
            bic: 0.0,
            hqic: 0.0,
            log_likelihood: 0.0,
            r_squared,
            adj_r_squared: r_squared,
            sigma2: 1.0,
        }
    }

    #[test]
    fn clean_residuals_score_full_marks() {
        let score = score_adequacy(&basic(0.0, 1.0, 0.1, 0.2), &normality(true), Some(&ljung_box(0.6)));
        assert_eq!(score.score, 100);
        assert_eq!(score.level, AdequacyLevel::Excellent);
        assert!(score.issues.is_empty());
        assert!(score.checks.no_autocorrelation && score.checks.normal_distribution);
    }

    #[test]
    fn every_penalty_applies() {
        let score = score_adequacy(&basic(0.5, 1.0, 1.5, 4.0), &normality(false), Some(&ljung_box(0.01)));
        assert_eq!(score.score, 100 - 10 - 15 - 20 - 10 - 10);
        assert_eq!(score.level, AdequacyLevel::Poor);
        assert_eq!(score.issues.len(), 5);
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(AdequacyLevel::from_score(90), AdequacyLevel::Excellent);
        assert_eq!(AdequacyLevel::from_score(89), AdequacyLevel::Good);
        assert_eq!(AdequacyLevel::from_score(75), AdequacyLevel::Good);
        assert_eq!(AdequacyLevel::from_score(60), AdequacyLevel::Fair);
        assert_eq!(AdequacyLevel::from_score(59), AdequacyLevel::Poor);
    }

    #[test]
    fn missing_tests_cost_nothing() {
        let score = score_adequacy(&basic(0.0, 1.0, 0.0, 0.0), &NormalityTests::default(), None);
        assert_eq!(score.score, 100);
        assert!(!score.checks.normal_distribution);
        assert!(!score.checks.no_autocorrelation);
        assert!(score
            .recommendation
            .ends_with("(not checked: normality, autocorrelation)"));

        let partial = score_adequacy(&basic(0.0, 1.0, 0.0, 0.0), &normality(true), None);
        assert!(partial.recommendation.ends_with("(not checked: autocorrelation)"));
    }

    #[test]
    fn composite_adequacy() {
        let residual = score_adequacy(&basic(0.0, 1.0, 0.0, 0.0), &normality(false), None);
        // 20 + 20 + floor(0.6 * 85) = 91
        let adequacy = assess_model_adequacy(&fit(0.9), Some(&residual));
        assert_eq!(adequacy.score, 91);
        assert_eq!(adequacy.level, ModelAdequacyLevel::High);
        // 20 + 5 + 0
        let bare = assess_model_adequacy(&fit(0.1), None);
        assert_eq!(bare.score, 25);
        assert_eq!(bare.level, ModelAdequacyLevel::Low);
        let perfect = score_adequacy(&basic(0.0, 1.0, 0.0, 0.0), &normality(true), None);
        assert_eq!(assess_model_adequacy(&fit(0.9), Some(&perfect)).score, 100);
    }
}
