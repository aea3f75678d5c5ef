//! Single-asset LONG/FLAT backtest over a position sequence.
//!
//! Day 0 is the first position date and the state before it is FLAT. NAV and
//! benchmark start from 1.0; a LONG day 0 is an entry and pays the cost, so
//! `nav_0 = 1 - cost` and the daily returns open with `-cost`. For every
//! later day t:
//!
//! ```text
//! r_t      = close_t / close_{t-1} - 1
//! strat_t  = r_t * [pos_t == LONG] - cost * [pos_t != pos_{t-1}]
//! nav_t    = nav_{t-1} * (1 + strat_t)
//! bench_t  = bench_{t-1} * (1 + r_t)
//! ```

use crate::domain::error::RsrsError;
use crate::domain::metrics;
use crate::domain::series::SeriesStore;
use crate::domain::signal::{Position, Signal};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub nav: f64,
}

/// One contiguous LONG segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub entry_date: NaiveDate,
    /// First FLAT date for a closed trade, last backtest date for an open one.
    pub exit_date: NaiveDate,
    pub holding_days: usize,
    pub return_over_segment: f64,
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub equity_curve: Vec<EquityPoint>,
    pub benchmark_curve: Vec<EquityPoint>,
    pub daily_returns: Vec<f64>,
    pub cost_bps: f64,
    pub cumulative_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    /// `None` when the daily returns have zero variance.
    pub sharpe_ratio: Option<f64>,
    pub win_rate: f64,
    pub turnover: f64,
    pub position_changes: usize,
    pub benchmark_return: f64,
    pub trades: Vec<TradeRecord>,
}

impl BacktestResult {
    pub fn final_nav(&self) -> f64 {
        self.equity_curve.last().map(|p| p.nav).unwrap_or(1.0)
    }

    pub fn final_benchmark_nav(&self) -> f64 {
        self.benchmark_curve.last().map(|p| p.nav).unwrap_or(1.0)
    }

    /// Outperformance against buy-and-hold: (nav - bh) / bh.
    pub fn excess_return(&self) -> f64 {
        metrics::excess_over(self.final_nav(), self.final_benchmark_nav())
    }

    pub fn total_days(&self) -> usize {
        self.equity_curve.len()
    }
}

struct OpenTrade {
    entry_date: NaiveDate,
    growth: f64,
    holding_days: usize,
}

impl OpenTrade {
    fn close(self, exit_date: NaiveDate, closed: bool) -> TradeRecord {
        TradeRecord {
            entry_date: self.entry_date,
            exit_date,
            holding_days: self.holding_days,
            return_over_segment: self.growth - 1.0,
            closed,
        }
    }
}

pub fn run(
    positions: &[Position],
    prices: &SeriesStore,
    cost_bps: f64,
) -> Result<BacktestResult, RsrsError> {
    if !cost_bps.is_finite() || cost_bps < 0.0 {
        return Err(RsrsError::InvalidCost { cost_bps });
    }
    let first = positions.first().ok_or_else(|| RsrsError::MalformedInput {
        line: 0,
        reason: "no positions to backtest".to_string(),
    })?;
    let mut index = prices
        .index_of(first.date)
        .ok_or(RsrsError::MissingDate { date: first.date })?;

    let cost = cost_bps / 10_000.0;
    let points = prices.points();

    let entered = first.signal.is_long();
    let mut nav = 1.0;
    let mut bench = 1.0;
    let mut equity_curve = Vec::with_capacity(positions.len());
    let mut benchmark_curve = Vec::with_capacity(positions.len());
    let mut daily_returns = Vec::with_capacity(positions.len());
    if entered {
        nav -= cost;
        daily_returns.push(-cost);
    }
    equity_curve.push(EquityPoint {
        date: first.date,
        nav,
    });
    benchmark_curve.push(EquityPoint {
        date: first.date,
        nav: bench,
    });

    let mut long_days = 0usize;
    let mut winning_days = 0usize;
    let mut position_changes = usize::from(entered);
    let mut trades = Vec::new();
    let mut open = entered.then_some(OpenTrade {
        entry_date: first.date,
        growth: 1.0 - cost,
        holding_days: 1,
    });

    for (k, pair) in positions.windows(2).enumerate() {
        let (prev, pos) = (pair[0], pair[1]);
        let i = prices
            .index_of(pos.date)
            .ok_or(RsrsError::MissingDate { date: pos.date })?;
        if i != index + 1 {
            return Err(RsrsError::MalformedInput {
                line: k + 2,
                reason: format!(
                    "position on {} does not follow {} in the price series",
                    pos.date, prev.date
                ),
            });
        }
        index = i;

        let r = points[i].simple_return(points[i - 1].close);
        let changed = pos.signal != prev.signal;
        let mut ret = if pos.signal.is_long() { r } else { 0.0 };
        if changed {
            ret -= cost;
            position_changes += 1;
        }
        if pos.signal.is_long() {
            long_days += 1;
            if r > 0.0 {
                winning_days += 1;
            }
        }

        nav *= 1.0 + ret;
        bench *= 1.0 + r;
        daily_returns.push(ret);
        equity_curve.push(EquityPoint { date: pos.date, nav });
        benchmark_curve.push(EquityPoint {
            date: pos.date,
            nav: bench,
        });

        match (prev.signal, pos.signal) {
            (Signal::Flat, Signal::Long) => {
                open = Some(OpenTrade {
                    entry_date: pos.date,
                    growth: 1.0 + ret,
                    holding_days: 1,
                });
            }
            (Signal::Long, Signal::Long) => {
                if let Some(trade) = open.as_mut() {
                    trade.growth *= 1.0 + ret;
                    trade.holding_days += 1;
                }
            }
            (Signal::Long, Signal::Flat) => {
                if let Some(mut trade) = open.take() {
                    trade.growth *= 1.0 + ret;
                    trades.push(trade.close(pos.date, true));
                }
            }
            (Signal::Flat, Signal::Flat) => {}
        }
    }

    if let Some(trade) = open {
        let last = equity_curve.last().map(|p| p.date).unwrap_or(first.date);
        trades.push(trade.close(last, false));
    }

    // Metrics are measured from the starting capital, before any day-0 entry cost.
    let navs: Vec<f64> = entered
        .then_some(1.0)
        .into_iter()
        .chain(equity_curve.iter().map(|p| p.nav))
        .collect();
    let bench_navs: Vec<f64> = benchmark_curve.iter().map(|p| p.nav).collect();
    let win_rate = if long_days > 0 {
        winning_days as f64 / long_days as f64
    } else {
        0.0
    };

    Ok(BacktestResult {
        cost_bps,
        cumulative_return: metrics::cumulative_return(&navs),
        annualized_return: metrics::annualized_return(&navs),
        max_drawdown: metrics::max_drawdown(&navs),
        sharpe_ratio: metrics::sharpe_ratio(&daily_returns).ok(),
        win_rate,
        turnover: position_changes as f64 / positions.len() as f64,
        position_changes,
        benchmark_return: metrics::cumulative_return(&bench_navs),
        equity_curve,
        benchmark_curve,
        daily_returns,
        trades,
    })
}

/// One backtest per cost level, in the order given.
pub fn cost_sensitivity(
    positions: &[Position],
    prices: &SeriesStore,
    costs_bps: &[f64],
) -> Result<Vec<BacktestResult>, RsrsError> {
    costs_bps
        .iter()
        .map(|&cost| run(positions, prices, cost))
        .collect()
}
