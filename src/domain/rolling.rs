//! Sliding-window statistics with O(1) updates.
//!
//! Both buffers keep running means and centred co-moments rather than raw
//! sums, so long price series (thousands of days around levels of 1e3) do not
//! lose precision to cancellation. While the window fills, values are added
//! with Welford's update. Once it is full, each push replaces the oldest value
//! using the exact identity
//!
//! `C' = C + a*b - c*d - (a - c)*(b - d) / n`
//!
//! where `a, b` are the new pair's deviations and `c, d` the evicted pair's
//! deviations from the current means.

use std::collections::VecDeque;

/// Relative tolerance under which a variance is treated as zero.
const ZERO_VARIANCE_TOL: f64 = 1e-24;

fn is_degenerate(comoment: f64, n: f64, mean: f64) -> bool {
    comoment <= ZERO_VARIANCE_TOL * n * mean.mul_add(mean, 1.0)
}

/// Rolling mean and population standard deviation over the last `window` values.
#[derive(Debug, Clone)]
pub struct RollingMoments {
    window: usize,
    values: VecDeque<f64>,
    mean: f64,
    m2: f64,
}

impl RollingMoments {
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "rolling window must be positive");
        Self {
            window,
            values: VecDeque::with_capacity(window),
            mean: 0.0,
            m2: 0.0,
        }
    }

    pub fn push(&mut self, x: f64) {
        if self.values.len() < self.window {
            let n = (self.values.len() + 1) as f64;
            let delta = x - self.mean;
            self.mean += delta / n;
            self.m2 += delta * (x - self.mean);
        } else if let Some(old) = self.values.pop_front() {
            let n = self.window as f64;
            let a = x - self.mean;
            let c = old - self.mean;
            self.m2 += a * a - c * c - (a - c) * (a - c) / n;
            self.mean += (x - old) / n;
        }
        self.m2 = self.m2.max(0.0);
        self.values.push_back(x);
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.window
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance; zero for an empty or near-constant window.
    pub fn variance(&self) -> f64 {
        let n = self.values.len() as f64;
        if n == 0.0 || is_degenerate(self.m2, n, self.mean) {
            0.0
        } else {
            self.m2 / n
        }
    }

    pub fn std(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// Result of a least-squares fit `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Rolling simple linear regression of `y` on `x`.
#[derive(Debug, Clone)]
pub struct RollingRegression {
    window: usize,
    pairs: VecDeque<(f64, f64)>,
    mean_x: f64,
    mean_y: f64,
    cxx: f64,
    cyy: f64,
    cxy: f64,
}

impl RollingRegression {
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "rolling window must be positive");
        Self {
            window,
            pairs: VecDeque::with_capacity(window),
            mean_x: 0.0,
            mean_y: 0.0,
            cxx: 0.0,
            cyy: 0.0,
            cxy: 0.0,
        }
    }

    pub fn push(&mut self, x: f64, y: f64) {
        if self.pairs.len() < self.window {
            let n = (self.pairs.len() + 1) as f64;
            let dx = x - self.mean_x;
            let dy = y - self.mean_y;
            self.mean_x += dx / n;
            self.mean_y += dy / n;
            self.cxx += dx * (x - self.mean_x);
            self.cyy += dy * (y - self.mean_y);
            self.cxy += dx * (y - self.mean_y);
        } else if let Some((xo, yo)) = self.pairs.pop_front() {
            let n = self.window as f64;
            let a = x - self.mean_x;
            let b = y - self.mean_y;
            let c = xo - self.mean_x;
            let d = yo - self.mean_y;
            self.cxx += a * a - c * c - (a - c) * (a - c) / n;
            self.cyy += b * b - d * d - (b - d) * (b - d) / n;
            self.cxy += a * b - c * d - (a - c) * (b - d) / n;
            self.mean_x += (x - xo) / n;
            self.mean_y += (y - yo) / n;
        }
        self.cxx = self.cxx.max(0.0);
        self.cyy = self.cyy.max(0.0);
        self.pairs.push_back((x, y));
    }

    pub fn is_full(&self) -> bool {
        self.pairs.len() == self.window
    }

    /// OLS fit over the current window, once it is full.
    ///
    /// A window with no spread in `x` has slope 0; R² is 0 whenever either
    /// variable has no spread.
    pub fn fit(&self) -> Option<LinearFit> {
        if !self.is_full() {
            return None;
        }
        let n = self.window as f64;
        if is_degenerate(self.cxx, n, self.mean_x) {
            return Some(LinearFit {
                slope: 0.0,
                intercept: self.mean_y,
                r_squared: 0.0,
            });
        }
        let slope = self.cxy / self.cxx;
        let r_squared = if is_degenerate(self.cyy, n, self.mean_y) {
            0.0
        } else {
            ((self.cxy * self.cxy) / (self.cxx * self.cyy)).clamp(0.0, 1.0)
        };
        Some(LinearFit {
            slope,
            intercept: self.mean_y - slope * self.mean_x,
            r_squared,
        })
    }

    /// Pearson correlation over the current full window; `None` if either side is flat.
    pub fn correlation(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        let n = self.window as f64;
        if is_degenerate(self.cxx, n, self.mean_x) || is_degenerate(self.cyy, n, self.mean_y) {
            return None;
        }
        Some((self.cxy / (self.cxx * self.cyy).sqrt()).clamp(-1.0, 1.0))
    }
}

/// Trailing simple moving average; `None` until `window` values have been seen.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut moments = RollingMoments::new(window);
    values
        .iter()
        .map(|&v| {
            moments.push(v);
            moments.is_full().then(|| moments.mean())
        })
        .collect()
}
