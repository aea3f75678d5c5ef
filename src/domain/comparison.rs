//! Side-by-side evaluation of score variants on one series.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::RsrsError;
use crate::domain::filter::{EntryFilter, EntryGate};
use crate::domain::indicator::{IndicatorMode, RegressionMode, ScoreMode};
use crate::domain::series::SeriesStore;
use crate::domain::sweep::{self, GridPoint, SweepSettings};

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyVariant {
    pub name: String,
    pub score: ScoreMode,
    pub buy_threshold: f64,
    pub sell_threshold: f64,
    pub filter: EntryFilter,
}

impl StrategyVariant {
    pub fn new(name: &str, score: ScoreMode) -> Self {
        let (buy_threshold, sell_threshold) = score.default_thresholds();
        Self {
            name: name.to_string(),
            score,
            buy_threshold,
            sell_threshold,
            filter: EntryFilter::None,
        }
    }

    pub fn with_filter(mut self, filter: EntryFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Shared run parameters for every variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonSettings {
    pub n: usize,
    pub m: usize,
    pub lag_days: usize,
    pub cost_bps: f64,
    pub regression: RegressionMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub name: String,
    pub outcome: Result<BacktestResult, RsrsError>,
}

impl ComparisonRow {
    pub fn trade_count(&self) -> usize {
        self.outcome.as_ref().map(|r| r.trades.len()).unwrap_or(0)
    }
}

/// Slope, standard, modified, right-skewed, R²-power and the two filtered
/// right-skewed strategies.
pub fn research_variants(
    score_power: f64,
    price_trend: EntryFilter,
    volume_correlation: EntryFilter,
) -> Vec<StrategyVariant> {
    vec![
        StrategyVariant::new("slope", ScoreMode::Slope),
        StrategyVariant::new("standard", ScoreMode::Standard),
        StrategyVariant::new("modified", ScoreMode::Modified),
        StrategyVariant::new("right_skewed", ScoreMode::RightSkewed),
        StrategyVariant::new("r_squared_power", ScoreMode::RSquaredPower(score_power)),
        StrategyVariant::new("right_skewed_price_trend", ScoreMode::RightSkewed)
            .with_filter(price_trend),
        StrategyVariant::new("right_skewed_volume_correlation", ScoreMode::RightSkewed)
            .with_filter(volume_correlation),
    ]
}

pub fn compare(
    series: &SeriesStore,
    variants: &[StrategyVariant],
    settings: &ComparisonSettings,
) -> Vec<ComparisonRow> {
    variants
        .iter()
        .map(|variant| {
            let point = GridPoint {
                n: settings.n,
                m: settings.m,
                s1: variant.buy_threshold,
                s2: variant.sell_threshold,
                cost_bps: settings.cost_bps,
            };
            let run = SweepSettings {
                mode: IndicatorMode {
                    regression: settings.regression,
                    score: variant.score,
                },
                lag_days: settings.lag_days,
                filter: variant.filter,
                parallel: false,
            };
            let outcome = EntryGate::build(series, variant.filter)
                .and_then(|gate| sweep::evaluate(series, &point, &run, &gate));
            ComparisonRow {
                name: variant.name.clone(),
                outcome,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PricePoint;
    use chrono::{Duration, NaiveDate};

    fn series(len: usize) -> SeriesStore {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let points = (0..len)
            .map(|i| {
                let t = i as f64;
                let close = 50.0 + (t * 0.09).sin() * 6.0 + t * 0.03;
                let spread = 0.8 + (t * 0.4).cos().abs() * 0.5;
                PricePoint {
                    date: start + Duration::days(i as i64),
                    open: close,
                    high: close + spread,
                    low: close - spread,
                    close,
                    volume: 1_000.0 + (t * 0.2).sin() * 300.0,
                }
            })
            .collect();
        SeriesStore::new(points).unwrap()
    }

    fn settings() -> ComparisonSettings {
        ComparisonSettings {
            n: 10,
            m: 60,
            lag_days: 1,
            cost_bps: 0.0,
            regression: RegressionMode::HighOnLow,
        }
    }

    #[test]
    fn research_variants_use_mode_thresholds() {
        let variants = research_variants(
            2.0,
            EntryFilter::PriceTrend {
                period: 20,
                lookback: 3,
            },
            EntryFilter::VolumeCorrelation { window: 10 },
        );
        assert_eq!(variants.len(), 7);
        assert_eq!(variants[0].buy_threshold, 1.0);
        assert_eq!(variants[0].sell_threshold, 0.8);
        assert_eq!(variants[3].buy_threshold, 0.7);
        assert_eq!(variants[4].score, ScoreMode::RSquaredPower(2.0));
        assert!(matches!(variants[5].filter, EntryFilter::PriceTrend { .. }));
        assert!(matches!(variants[6].filter, EntryFilter::VolumeCorrelation { .. }));
    }

    #[test]
    fn compare_runs_every_variant_in_order() {
        let s = series(220);
        let variants = research_variants(
            2.0,
            EntryFilter::PriceTrend {
                period: 20,
                lookback: 3,
            },
            EntryFilter::VolumeCorrelation { window: 10 },
        );
        let rows = compare(&s, &variants, &settings());
        assert_eq!(rows.len(), variants.len());
        for (row, variant) in rows.iter().zip(&variants) {
            assert_eq!(row.name, variant.name);
            let result = row.outcome.as_ref().unwrap();
            assert_eq!(result.equity_curve.len(), 220 - 9);
        }
    }

    #[test]
    fn benchmark_is_shared_across_variants() {
        let s = series(200);
        let rows = compare(
            &s,
            &[
                StrategyVariant::new("standard", ScoreMode::Standard),
                StrategyVariant::new("modified", ScoreMode::Modified),
            ],
            &settings(),
        );
        let a = rows[0].outcome.as_ref().unwrap();
        let b = rows[1].outcome.as_ref().unwrap();
        assert_eq!(a.benchmark_return, b.benchmark_return);
    }

    #[test]
    fn failing_variant_reports_error() {
        let s = series(50);
        let rows = compare(
            &s,
            &[StrategyVariant::new("standard", ScoreMode::Standard)],
            &settings(),
        );
        assert!(matches!(
            rows[0].outcome,
            Err(RsrsError::InsufficientHistory { .. })
        ));
        assert_eq!(rows[0].trade_count(), 0);
    }
}
