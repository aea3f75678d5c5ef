//! Predictive-power analysis of an indicator score.
//!
//! For each sample with a score, the forward k-day return
//! `close[t+k] / close[t] - 1` is paired with the score. Pairs are grouped
//! into fixed-width score bins (mean forward return and share of positive
//! outcomes per bin) and correlated with the score separately on the right
//! side (score > 0), the left side (score <= 0) and in total.
//!
//! Distribution statistics use sample estimators: `n - 1` standard
//! deviation, adjusted Fisher-Pearson skewness and bias-corrected excess
//! kurtosis.

use crate::domain::error::RsrsError;
use crate::domain::indicator::IndicatorSample;
use crate::domain::rolling::{rolling_mean, RollingRegression};
use crate::domain::series::SeriesStore;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub skewness: Option<f64>,
    pub excess_kurtosis: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForwardObservation {
    pub date: NaiveDate,
    pub score: f64,
    pub forward_return: f64,
    pub up: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub mean_return: f64,
    pub up_probability: f64,
}

/// Correlation of score against an outcome; `None` when undefined.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SideCorrelations {
    pub right: Option<f64>,
    pub left: Option<f64>,
    pub total: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisSettings {
    pub forward_days: usize,
    pub bin_width: f64,
    /// First date included in the distribution statistics.
    pub start_date: Option<NaiveDate>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            forward_days: 10,
            bin_width: 0.1,
            start_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreAnalysis {
    pub distribution: Option<DistributionStats>,
    pub observations: Vec<ForwardObservation>,
    pub bins: Vec<ScoreBin>,
    pub expected_return: SideCorrelations,
    pub up_probability: SideCorrelations,
}

pub fn analyze(
    samples: &[IndicatorSample],
    series: &SeriesStore,
    settings: AnalysisSettings,
) -> Result<ScoreAnalysis, RsrsError> {
    let observations = forward_returns(samples, series, settings.forward_days)?;
    let bins = bin_by_score(&observations, settings.bin_width)?;
    Ok(ScoreAnalysis {
        distribution: score_distribution(samples, settings.start_date),
        expected_return: side_correlations(&observations, |o| o.forward_return),
        up_probability: side_correlations(&observations, |o| if o.up { 1.0 } else { 0.0 }),
        observations,
        bins,
    })
}

pub fn distribution(values: &[f64]) -> Option<DistributionStats> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for v in values {
        let d = v - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    let std = if values.len() > 1 {
        (m2 / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    m2 /= n;
    m3 /= n;
    m4 /= n;

    let spread = m2 > 0.0;
    let skewness = (spread && values.len() > 2)
        .then(|| m3 / m2.powf(1.5) * (n * (n - 1.0)).sqrt() / (n - 2.0));
    let excess_kurtosis = (spread && values.len() > 3).then(|| {
        let g2 = m4 / (m2 * m2) - 3.0;
        (n - 1.0) / ((n - 2.0) * (n - 3.0)) * ((n + 1.0) * g2 + 6.0)
    });

    Some(DistributionStats {
        count: values.len(),
        mean,
        std,
        skewness,
        excess_kurtosis,
    })
}

/// Distribution of the adjusted score on or after `start`.
pub fn score_distribution(
    samples: &[IndicatorSample],
    start: Option<NaiveDate>,
) -> Option<DistributionStats> {
    let scores: Vec<f64> = samples
        .iter()
        .filter(|s| start.is_none_or(|d| s.date >= d))
        .filter_map(|s| s.adjusted_score)
        .collect();
    distribution(&scores)
}

/// Forward return for every scored sample with `forward_days` bars after it.
pub fn forward_returns(
    samples: &[IndicatorSample],
    series: &SeriesStore,
    forward_days: usize,
) -> Result<Vec<ForwardObservation>, RsrsError> {
    if forward_days == 0 {
        return Err(RsrsError::InvalidWindow {
            reason: "forward horizon must be at least 1 day".to_string(),
        });
    }
    let points = series.points();
    let mut observations = Vec::with_capacity(samples.len());
    for sample in samples {
        let i = series
            .index_of(sample.date)
            .ok_or(RsrsError::MissingDate { date: sample.date })?;
        let (Some(score), Some(ahead)) = (sample.adjusted_score, points.get(i + forward_days))
        else {
            continue;
        };
        let forward_return = ahead.close / points[i].close - 1.0;
        observations.push(ForwardObservation {
            date: sample.date,
            score,
            forward_return,
            up: forward_return > 0.0,
        });
    }
    Ok(observations)
}

/// Bins `[k*width, (k+1)*width)` in ascending order; empty bins are omitted.
pub fn bin_by_score(
    observations: &[ForwardObservation],
    width: f64,
) -> Result<Vec<ScoreBin>, RsrsError> {
    if !width.is_finite() || width <= 0.0 {
        return Err(RsrsError::InvalidWindow {
            reason: format!("bin width must be positive, got {}", width),
        });
    }

    // key -> (count, return sum, up count)
    let mut groups: BTreeMap<i64, (usize, f64, usize)> = BTreeMap::new();
    for obs in observations {
        let key = (obs.score / width).floor() as i64;
        let entry = groups.entry(key).or_default();
        entry.0 += 1;
        entry.1 += obs.forward_return;
        entry.2 += usize::from(obs.up);
    }

    Ok(groups
        .into_iter()
        .map(|(key, (count, sum, ups))| ScoreBin {
            lower: key as f64 * width,
            upper: (key + 1) as f64 * width,
            count,
            mean_return: sum / count as f64,
            up_probability: ups as f64 / count as f64,
        })
        .collect())
}

pub fn side_correlations<F>(observations: &[ForwardObservation], value: F) -> SideCorrelations
where
    F: Fn(&ForwardObservation) -> f64,
{
    let pairs = |keep: &dyn Fn(f64) -> bool| -> Vec<(f64, f64)> {
        observations
            .iter()
            .filter(|o| keep(o.score))
            .map(|o| (o.score, value(o)))
            .collect()
    };
    SideCorrelations {
        right: pearson(&pairs(&|s: f64| s > 0.0)),
        left: pearson(&pairs(&|s: f64| s <= 0.0)),
        total: pearson(&pairs(&|_: f64| true)),
    }
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let mut regression = RollingRegression::new(pairs.len());
    for &(x, y) in pairs {
        regression.push(x, y);
    }
    regression.correlation()
}

/// Trailing mean of the slope, aligned with `samples`.
pub fn slope_rolling_mean(samples: &[IndicatorSample], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; samples.len()];
    }
    let slopes: Vec<f64> = samples.iter().map(|s| s.slope).collect();
    rolling_mean(&slopes, window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PricePoint;
    use approx::assert_abs_diff_eq;
    use chrono::Duration;

    fn day(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, 1).unwrap() + Duration::days(i as i64)
    }

    fn series(closes: &[f64]) -> SeriesStore {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::hlc(day(i), c + 1.0, c - 1.0, c))
            .collect();
        SeriesStore::new(points).unwrap()
    }

    fn samples(scores: &[Option<f64>]) -> Vec<IndicatorSample> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &s)| IndicatorSample {
                date: day(i),
                slope: i as f64,
                r_squared: 1.0,
                raw_score: i as f64,
                standardized_score: s,
                adjusted_score: s,
            })
            .collect()
    }

    fn obs(score: f64, forward_return: f64) -> ForwardObservation {
        ForwardObservation {
            date: day(0),
            score,
            forward_return,
            up: forward_return > 0.0,
        }
    }

    #[test]
    fn distribution_of_symmetric_values() {
        let stats = distribution(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert_abs_diff_eq!(stats.mean, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.std, 2.5f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(stats.skewness.unwrap(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.excess_kurtosis.unwrap(), -1.2, epsilon = 1e-12);
    }

    #[test]
    fn distribution_of_right_tail_is_positively_skewed() {
        let stats = distribution(&[1.0, 2.0, 10.0]).unwrap();
        assert!(stats.skewness.unwrap() > 0.0);
        assert_eq!(stats.excess_kurtosis, None);
    }

    #[test]
    fn distribution_edge_cases() {
        assert_eq!(distribution(&[]), None);
        let single = distribution(&[4.0]).unwrap();
        assert_eq!(single.std, 0.0);
        assert_eq!(single.skewness, None);
        let flat = distribution(&[2.0; 6]).unwrap();
        assert_eq!(flat.skewness, None);
        assert_eq!(flat.excess_kurtosis, None);
    }

    #[test]
    fn score_distribution_respects_start_date() {
        let s = samples(&[Some(100.0), None, Some(1.0), Some(3.0)]);
        let stats = score_distribution(&s, Some(day(1))).unwrap();
        assert_eq!(stats.count, 2);
        assert_abs_diff_eq!(stats.mean, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn forward_returns_skip_tail_and_missing_scores() {
        let prices = series(&[100.0, 110.0, 99.0, 121.0, 100.0]);
        let s = samples(&[Some(0.5), None, Some(-0.2), Some(1.0), Some(0.0)]);
        let observed = forward_returns(&s, &prices, 2).unwrap();
        assert_eq!(observed.len(), 2);
        assert_eq!(observed[0].date, day(0));
        assert_abs_diff_eq!(observed[0].forward_return, -0.01, epsilon = 1e-12);
        assert!(!observed[0].up);
        assert_eq!(observed[1].date, day(2));
        assert_abs_diff_eq!(observed[1].forward_return, 100.0 / 99.0 - 1.0, epsilon = 1e-12);
        assert!(observed[1].up);
    }

    #[test]
    fn forward_returns_reject_zero_horizon() {
        let prices = series(&[100.0, 101.0]);
        assert!(matches!(
            forward_returns(&samples(&[Some(1.0)]), &prices, 0),
            Err(RsrsError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn bins_group_by_floor() {
        let observed = [
            obs(0.05, 0.02),
            obs(0.09, -0.01),
            obs(0.15, 0.04),
            obs(-0.05, -0.03),
        ];
        let bins = bin_by_score(&observed, 0.1).unwrap();
        assert_eq!(bins.len(), 3);

        assert_abs_diff_eq!(bins[0].lower, -0.1, epsilon = 1e-12);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[0].up_probability, 0.0);

        assert_abs_diff_eq!(bins[1].lower, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bins[1].upper, 0.1, epsilon = 1e-12);
        assert_eq!(bins[1].count, 2);
        assert_abs_diff_eq!(bins[1].mean_return, 0.005, epsilon = 1e-12);
        assert_abs_diff_eq!(bins[1].up_probability, 0.5, epsilon = 1e-12);

        assert_eq!(bins[2].count, 1);
        assert!(bin_by_score(&observed, 0.0).is_err());
    }

    #[test]
    fn correlations_by_side() {
        let observed = [
            obs(-2.0, 0.04),
            obs(-1.0, 0.02),
            obs(-0.5, 0.01),
            obs(0.5, 0.01),
            obs(1.0, 0.02),
            obs(2.0, 0.04),
        ];
        let corr = side_correlations(&observed, |o| o.forward_return);
        assert_abs_diff_eq!(corr.right.unwrap(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(corr.left.unwrap(), -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(corr.total.unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn correlation_undefined_for_single_side_point() {
        let observed = [obs(1.0, 0.01), obs(-1.0, 0.02), obs(-2.0, 0.03)];
        let corr = side_correlations(&observed, |o| o.forward_return);
        assert_eq!(corr.right, None);
        assert!(corr.left.is_some());
    }

    #[test]
    fn analyze_combines_parts() {
        let prices = series(&[100.0, 102.0, 101.0, 104.0, 103.0, 107.0, 106.0]);
        let s = samples(&[Some(0.3), Some(-0.4), Some(0.8), Some(-0.1), Some(0.6), None, None]);
        let settings = AnalysisSettings {
            forward_days: 1,
            bin_width: 0.5,
            start_date: None,
        };
        let analysis = analyze(&s, &prices, settings).unwrap();
        assert_eq!(analysis.observations.len(), 5);
        assert_eq!(analysis.distribution.unwrap().count, 5);
        assert_eq!(
            analysis.bins.iter().map(|b| b.count).sum::<usize>(),
            analysis.observations.len()
        );
    }

    #[test]
    fn slope_rolling_mean_warmup() {
        let s = samples(&[None; 5]);
        let means = slope_rolling_mean(&s, 3);
        assert_eq!(means[0], None);
        assert_eq!(means[1], None);
        assert_abs_diff_eq!(means[2].unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(means[4].unwrap(), 3.0, epsilon = 1e-12);
    }
}
