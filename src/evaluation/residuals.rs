//! Residual diagnostics.

use crate::error::{InsightError, Result};
use crate::evaluation::adequacy::{score_adequacy, AdequacyScore};
use crate::identification::{acf_pacf, Correlogram};
use crate::utils::stats::{excess_kurtosis, mean, skewness, std_dev};
use crate::validation::{
    heteroskedasticity_test, jarque_bera, ljung_box, shapiro_wilk, HeteroskedasticityTest,
    LjungBoxResult, NormalityTest,
};
use crate::validation::residual_tests::SHAPIRO_MAX_N;
use log::debug;
use serde::Serialize;

/// Lags of the residual correlograms.
const RESIDUAL_LAGS: usize = 20;
/// Significance level of every residual test.
pub const RESIDUAL_ALPHA: f64 = 0.05;

/// Moments of the residuals. Kurtosis is excess kurtosis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicStatistics {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub n_observations: usize,
}

impl BasicStatistics {
    pub fn of(values: &[f64]) -> Self {
        Self {
            mean: mean(values),
            std: std_dev(values),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            skewness: skewness(values),
            kurtosis: excess_kurtosis(values),
            n_observations: values.len(),
        }
    }
}

/// Normality tests; a test that could not run is `None` with a note.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalityTests {
    pub jarque_bera: Option<NormalityTest>,
    /// Skipped above 5000 observations.
    pub shapiro_wilk: Option<NormalityTest>,
}

/// Residual ACF/PACF and whether any lag is significant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualCorrelograms {
    pub acf: Correlogram,
    pub pacf: Correlogram,
    pub significant_autocorrelation: bool,
    pub significant_partial_autocorrelation: bool,
    pub interpretation: String,
}

/// Everything known about a residual sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualAnalysis {
    pub basic_statistics: BasicStatistics,
    pub normality: NormalityTests,
    pub autocorrelation: Option<LjungBoxResult>,
    pub heteroskedasticity: Option<HeteroskedasticityTest>,
    pub correlograms: Option<ResidualCorrelograms>,
    pub overall_assessment: AdequacyScore,
    /// Tests that could not run, with the reason.
    pub notes: Vec<String>,
}

impl ResidualAnalysis {
    /// Ljung-Box decision at the largest lag tested.
    pub fn is_white_noise(&self) -> Option<bool> {
        self.autocorrelation
            .as_ref()
            .map(|lb| lb.is_white_noise(RESIDUAL_ALPHA))
    }
}

fn record<T>(notes: &mut Vec<String>, name: &str, outcome: Result<T>) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("residual {} test skipped: {}", name, e);
            notes.push(format!("{}: {}", name, e));
            None
        }
    }
}

fn residual_correlograms(residuals: &[f64]) -> Result<ResidualCorrelograms> {
    let (acf, pacf) = acf_pacf(residuals, RESIDUAL_LAGS, RESIDUAL_ALPHA)?;
    let significant_autocorrelation = (1..acf.values.len()).any(|k| acf.is_significant(k));
    let significant_partial_autocorrelation = (1..pacf.values.len()).any(|k| pacf.is_significant(k));
    let interpretation = if significant_autocorrelation || significant_partial_autocorrelation {
        "residuals show significant autocorrelation"
    } else {
        "no significant residual autocorrelation"
    }
    .to_string();
    Ok(ResidualCorrelograms {
        acf,
        pacf,
        significant_autocorrelation,
        significant_partial_autocorrelation,
        interpretation,
    })
}

/// Run every residual diagnostic.
///
/// Individual tests that cannot run are recorded in `notes`; the call fails
/// only for empty or non-finite input.
pub fn analyze_residuals(residuals: &[f64]) -> Result<ResidualAnalysis> {
    if residuals.is_empty() {
        return Err(InsightError::EmptyData);
    }
    if residuals.iter().any(|r| !r.is_finite()) {
        return Err(InsightError::MissingValues);
    }

    let mut notes = Vec::new();
    let basic_statistics = BasicStatistics::of(residuals);

    let normality = NormalityTests {
        jarque_bera: record(&mut notes, "jarque-bera", jarque_bera(residuals)),
        shapiro_wilk: if residuals.len() <= SHAPIRO_MAX_N {
            record(&mut notes, "shapiro-wilk", shapiro_wilk(residuals))
        } else {
            None
        },
    };
    let autocorrelation = record(&mut notes, "ljung-box", ljung_box(residuals, None));
    let heteroskedasticity = record(
        &mut notes,
        "heteroskedasticity",
        heteroskedasticity_test(residuals),
    );
    let correlograms = record(&mut notes, "correlogram", residual_correlograms(residuals));
    let overall_assessment = score_adequacy(&basic_statistics, &normality, autocorrelation.as_ref());

    Ok(ResidualAnalysis {
        basic_statistics,
        normality,
        autocorrelation,
        heteroskedasticity,
        correlograms,
        overall_assessment,
        notes,
    })
}
