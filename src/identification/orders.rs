//! Box-Jenkins candidate order generation.

use crate::config::IdentificationConfig;
use crate::error::Result;
use crate::identification::correlogram::{acf_pacf, default_lags, Correlogram};
use crate::identification::pattern::{classify_correlogram, PatternAnalysis};
use crate::models::ModelOrder;
use log::debug;
use serde::Serialize;

/// Confidence of an order read directly off one cut-off correlogram.
const CONFIDENCE_CUTOFF: f64 = 0.8;
/// Confidence of the ARMA grid proposed when both correlograms tail off.
const CONFIDENCE_GRID: f64 = 0.6;
/// Confidence of orders taken from the highest significant lag.
const CONFIDENCE_SIGNIFICANT_LAG: f64 = 0.5;
/// Confidence of the fixed low-order backstop set.
const CONFIDENCE_BACKSTOP: f64 = 0.3;
/// Confidence of an order reaching an isolated spike past the leading run.
const CONFIDENCE_ISOLATED_SPIKE: f64 = 0.25;

/// A proposed model order with the reason it was proposed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateModel {
    pub order: ModelOrder,
    /// Short family label such as `AR(2)` or `ARMA(1,1)`.
    pub model_type: String,
    pub reasoning: String,
    /// Score in `[0, 1]`; higher is proposed first.
    pub confidence: f64,
}

impl CandidateModel {
    fn new(order: ModelOrder, model_type: String, reasoning: String, confidence: f64) -> Self {
        Self {
            order,
            model_type,
            reasoning,
            confidence,
        }
    }
}

/// Everything the identification stage produced for one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identification {
    pub acf: Correlogram,
    pub pacf: Correlogram,
    pub acf_analysis: PatternAnalysis,
    pub pacf_analysis: PatternAnalysis,
    /// Sorted by descending confidence, never empty.
    pub candidates: Vec<CandidateModel>,
    pub interpretation: String,
}

impl Identification {
    pub fn top_candidate(&self) -> Option<&CandidateModel> {
        self.candidates.first()
    }
}

/// Proposes ARIMA orders from ACF/PACF shape.
#[derive(Debug, Clone, Default)]
pub struct OrderIdentifier {
    config: IdentificationConfig,
}

impl OrderIdentifier {
    pub fn new(config: IdentificationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IdentificationConfig {
        &self.config
    }

    /// ACF and PACF with bands at the configured level.
    ///
    /// `lags` defaults to `min(n / 4, max_lags)`.
    pub fn compute_acf_pacf(
        &self,
        values: &[f64],
        lags: Option<usize>,
    ) -> Result<(Correlogram, Correlogram)> {
        let lags = lags.unwrap_or_else(|| default_lags(values.len(), self.config.max_lags));
        acf_pacf(values, lags, self.config.alpha)
    }

    /// Classify a correlogram against its band.
    pub fn classify_pattern(&self, correlogram: &Correlogram) -> PatternAnalysis {
        classify_correlogram(correlogram, &self.config.thresholds)
    }

    /// Candidate orders for a series already differenced `d` times.
    pub fn identify_orders(
        &self,
        values: &[f64],
        max_p: usize,
        max_q: usize,
        d: usize,
    ) -> Result<Identification> {
        let (acf, pacf) = self.compute_acf_pacf(values, None)?;
        let acf_analysis = self.classify_pattern(&acf);
        let pacf_analysis = self.classify_pattern(&pacf);
        debug!(
            "identification: ACF {} (lag {}), PACF {} (lag {})",
            acf_analysis.pattern, acf_analysis.cutoff_lag, pacf_analysis.pattern, pacf_analysis.cutoff_lag
        );

        let candidates = propose_candidates(
            &acf_analysis,
            &pacf_analysis,
            max_p,
            max_q,
            d,
            self.config.max_candidates,
        );
        let interpretation = interpret(&acf_analysis, &pacf_analysis, candidates.first());

        Ok(Identification {
            acf,
            pacf,
            acf_analysis,
            pacf_analysis,
            candidates,
            interpretation,
        })
    }
}

/// Apply the Box-Jenkins reading rules, then the backstop set.
pub fn propose_candidates(
    acf: &PatternAnalysis,
    pacf: &PatternAnalysis,
    max_p: usize,
    max_q: usize,
    d: usize,
    max_candidates: usize,
) -> Vec<CandidateModel> {
    let mut candidates = Vec::new();

    if acf.is_cutoff() && pacf.is_tail_off() {
        let (q, spike) = read_order(acf, acf.cutoff_lag, max_q);
        if q > 0 {
            candidates.push(CandidateModel::new(
                ModelOrder::new(0, d, q),
                format!("MA({})", q),
                format!("ACF cuts off after lag {}, PACF tails off", q),
                CONFIDENCE_CUTOFF,
            ));
        }
        if let Some(lag) = spike {
            candidates.push(spike_candidate(ModelOrder::new(0, d, lag), "ACF", q));
        }
    } else if pacf.is_cutoff() && acf.is_tail_off() {
        let (p, spike) = read_order(pacf, pacf.cutoff_lag, max_p);
        if p > 0 {
            candidates.push(CandidateModel::new(
                ModelOrder::new(p, d, 0),
                format!("AR({})", p),
                format!("PACF cuts off after lag {}, ACF tails off", p),
                CONFIDENCE_CUTOFF,
            ));
        }
        if let Some(lag) = spike {
            candidates.push(spike_candidate(ModelOrder::new(lag, d, 0), "PACF", p));
        }
    } else if acf.is_tail_off() && pacf.is_tail_off() {
        for p in 1..=max_p.min(3) {
            for q in 1..=max_q.min(3) {
                candidates.push(CandidateModel::new(
                    ModelOrder::new(p, d, q),
                    format!("ARMA({},{})", p, q),
                    "ACF and PACF both tail off".to_string(),
                    CONFIDENCE_GRID,
                ));
            }
        }
    } else {
        let (p, ar_spike) = read_order(pacf, pacf.last_significant_lag, max_p);
        if p > 0 {
            candidates.push(CandidateModel::new(
                ModelOrder::new(p, d, 0),
                format!("AR({})", p),
                "highest significant PACF lag".to_string(),
                CONFIDENCE_SIGNIFICANT_LAG,
            ));
        }
        let (q, ma_spike) = read_order(acf, acf.last_significant_lag, max_q);
        if q > 0 {
            candidates.push(CandidateModel::new(
                ModelOrder::new(0, d, q),
                format!("MA({})", q),
                "highest significant ACF lag".to_string(),
                CONFIDENCE_SIGNIFICANT_LAG,
            ));
        }
        if let Some(lag) = ar_spike {
            candidates.push(spike_candidate(ModelOrder::new(lag, d, 0), "PACF", p));
        }
        if let Some(lag) = ma_spike {
            candidates.push(spike_candidate(ModelOrder::new(0, d, lag), "ACF", q));
        }
    }

    for (p, q) in [(1, 0), (0, 1), (1, 1), (2, 0), (0, 2), (2, 1), (1, 2)] {
        let order = ModelOrder::new(p, d, q);
        if candidates.iter().all(|c| c.order != order) {
            candidates.push(CandidateModel::new(
                order,
                order.to_string(),
                "common low-order model".to_string(),
                CONFIDENCE_BACKSTOP,
            ));
        }
    }

    // Stable: equal confidences keep proposal order.
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    candidates.truncate(max_candidates.max(1));
    candidates
}

/// Order read off one correlogram up to `lag`, capped at `cap`.
///
/// When significant lags resume after a gap, the order stops at the leading
/// run and the capped `lag` comes back as a separate spike order.
fn read_order(analysis: &PatternAnalysis, lag: usize, cap: usize) -> (usize, Option<usize>) {
    let full = lag.min(cap);
    let run = analysis.leading_run().min(full);
    if run > 0 && run < full {
        (run, Some(full))
    } else {
        (full, None)
    }
}

fn spike_candidate(order: ModelOrder, name: &str, run: usize) -> CandidateModel {
    let lag = order.p.max(order.q);
    let model_type = if order.p > 0 {
        format!("AR({})", order.p)
    } else {
        format!("MA({})", order.q)
    };
    CandidateModel::new(
        order,
        model_type,
        format!("{} significant again at lag {} after a gap past lag {}", name, lag, run),
        CONFIDENCE_ISOLATED_SPIKE,
    )
}

fn describe(name: &str, analysis: &PatternAnalysis) -> String {
    let mut text = format!("{}: {}", name, analysis.pattern);
    if analysis.is_cutoff() {
        text.push_str(&format!("\n  - {} cuts off after lag {}", name, analysis.cutoff_lag));
    } else if analysis.is_tail_off() {
        text.push_str(&format!("\n  - {} decays gradually", name));
    }
    text
}

fn interpret(
    acf: &PatternAnalysis,
    pacf: &PatternAnalysis,
    top: Option<&CandidateModel>,
) -> String {
    let mut lines = vec![describe("ACF", acf), describe("PACF", pacf)];
    if let Some(candidate) = top {
        lines.push(format!("Recommended model: {}", candidate.model_type));
        lines.push(format!("Reason: {}", candidate.reasoning));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identification::pattern::Pattern;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn analysis(pattern: Pattern, cutoff_lag: usize, significant: Vec<usize>) -> PatternAnalysis {
        PatternAnalysis {
            pattern,
            cutoff_lag,
            last_significant_lag: significant.last().copied().unwrap_or(0),
            significant_lags: significant,
            max_significant_value: 0.5,
        }
    }

    fn orders(candidates: &[CandidateModel]) -> Vec<(usize, usize, usize)> {
        candidates.iter().map(|c| (c.order.p, c.order.d, c.order.q)).collect()
    }

    #[test]
    fn acf_cutoff_with_pacf_tail_off_proposes_ma() {
        let acf = analysis(Pattern::Cutoff, 2, vec![1, 2]);
        let pacf = analysis(Pattern::TailOff, 7, vec![1, 2, 3, 4, 5, 6, 7]);
        let candidates = propose_candidates(&acf, &pacf, 5, 5, 1, 10);
        assert_eq!(orders(&candidates)[0], (0, 1, 2));
        assert_eq!(candidates[0].confidence, 0.8);
        // (0, 1, 2) is not repeated by the backstop.
        assert_eq!(candidates.iter().filter(|c| c.order == ModelOrder::new(0, 1, 2)).count(), 1);
        assert_eq!(candidates.len(), 7);
    }

    #[test]
    fn pacf_cutoff_with_acf_tail_off_proposes_capped_ar() {
        let acf = analysis(Pattern::TailOff, 8, (1..=8).collect());
        let pacf = analysis(Pattern::Cutoff, 4, vec![1, 2, 3, 4]);
        let candidates = propose_candidates(&acf, &pacf, 3, 5, 0, 10);
        assert_eq!(orders(&candidates)[0], (3, 0, 0));
        assert!(candidates.iter().all(|c| c.confidence != 0.25));
    }

    #[test]
    fn isolated_pacf_spike_ranks_below_backstop() {
        let acf = analysis(Pattern::TailOff, 8, (1..=8).collect());
        let pacf = analysis(Pattern::Cutoff, 5, vec![1, 5]);
        let candidates = propose_candidates(&acf, &pacf, 5, 5, 1, 10);
        assert_eq!(orders(&candidates)[..3], [(1, 1, 0), (0, 1, 1), (1, 1, 1)]);
        assert_eq!(candidates[0].confidence, 0.8);

        let spike = candidates.last().unwrap();
        assert_eq!(spike.order, ModelOrder::new(5, 1, 0));
        assert_eq!(spike.confidence, 0.25);
        assert!(spike.reasoning.contains("lag 5"));
    }

    #[test]
    fn isolated_spike_is_capped_before_comparison() {
        let acf = analysis(Pattern::Cutoff, 6, vec![1, 2, 6]);
        let pacf = analysis(Pattern::TailOff, 9, (1..=9).collect());
        let candidates = propose_candidates(&acf, &pacf, 5, 4, 0, 10);
        assert_eq!(orders(&candidates)[0], (0, 0, 2));
        assert_eq!(orders(&candidates).last(), Some(&(0, 0, 4)));

        // A cap inside the leading run leaves no spike.
        let candidates = propose_candidates(&acf, &pacf, 5, 2, 0, 10);
        assert_eq!(orders(&candidates)[0], (0, 0, 2));
        assert!(candidates.iter().all(|c| c.confidence != 0.25));
    }

    #[test]
    fn late_first_lag_keeps_highest_significant_lag() {
        // No leading run: the order is read off the highest lag as before.
        let acf = analysis(Pattern::Cutoff, 3, vec![3]);
        let pacf = analysis(Pattern::TailOff, 7, (1..=7).collect());
        let candidates = propose_candidates(&acf, &pacf, 5, 5, 0, 10);
        assert_eq!(orders(&candidates)[0], (0, 0, 3));
    }

    #[test]
    fn both_tail_off_proposes_grid_and_truncates() {
        let tail = analysis(Pattern::TailOff, 9, (1..=9).collect());
        let candidates = propose_candidates(&tail, &tail, 5, 5, 0, 10);
        assert_eq!(candidates.len(), 10);
        assert!(candidates[..9].iter().all(|c| c.confidence == 0.6));
        assert_eq!(orders(&candidates)[0], (1, 0, 1));
        // First backstop order not already in the grid.
        assert_eq!(orders(&candidates)[9], (1, 0, 0));
    }

    #[test]
    fn ambiguous_patterns_use_highest_significant_lags() {
        let acf = analysis(Pattern::Cutoff, 1, vec![1]);
        let pacf = analysis(Pattern::Cutoff, 2, vec![1, 2]);
        let candidates = propose_candidates(&acf, &pacf, 5, 5, 0, 10);
        assert_eq!(orders(&candidates)[..2], [(2, 0, 0), (0, 0, 1)]);
        assert_eq!(candidates[1].confidence, 0.5);
    }

    #[test]
    fn ambiguous_patterns_split_gapped_lags() {
        let acf = analysis(Pattern::Cutoff, 1, vec![1]);
        let pacf = analysis(Pattern::Cutoff, 4, vec![1, 4]);
        let candidates = propose_candidates(&acf, &pacf, 5, 5, 0, 10);
        assert_eq!(orders(&candidates)[..2], [(1, 0, 0), (0, 0, 1)]);
        assert_eq!(orders(&candidates).last(), Some(&(4, 0, 0)));
    }

    #[test]
    fn white_noise_gets_backstop_only() {
        let wn = analysis(Pattern::WhiteNoise, 0, vec![]);
        let candidates = propose_candidates(&wn, &wn, 1, 1, 2, 10);
        assert_eq!(candidates.len(), 7);
        assert!(candidates.iter().all(|c| c.confidence == 0.3 && c.order.d == 2));
        assert_eq!(orders(&candidates)[0], (1, 2, 0));
    }

    #[test]
    fn identify_orders_on_ar1() {
        let mut rng = StdRng::seed_from_u64(5);
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut y = vec![0.0; 400];
        for t in 1..400 {
            y[t] = 0.7 * y[t - 1] + normal.sample(&mut rng);
        }
        let result = OrderIdentifier::default().identify_orders(&y, 5, 5, 0).unwrap();
        assert_eq!(result.acf.values.len(), 21);
        assert!(!result.candidates.is_empty());
        assert!(result.candidates.len() <= 10);
        assert!(result.pacf_analysis.significant_lags.contains(&1));
        assert!(result.interpretation.contains("Recommended model"));
        assert_eq!(result.top_candidate(), result.candidates.first());
        for pair in result.candidates.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn short_series_still_returns_candidates() {
        let result = OrderIdentifier::default()
            .identify_orders(&[1.0, 2.0, 1.5], 2, 2, 1)
            .unwrap();
        assert_eq!(result.candidates.len(), 7);
    }
}
