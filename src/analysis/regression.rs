//! Plain numeric routines: median, population standard deviation, and an
//! ordinary-least-squares line fit computed from sums.

use serde::{Deserialize, Serialize};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle value, or the mean of the two middle values for even lengths.
/// 0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population (divide by n) standard deviation; 0 for an empty slice.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// `part / total * 100`, or 0 when `total` is zero.
pub fn percent(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        part / total * 100.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub standard_error: f64,
    pub n: usize,
}

impl Regression {
    /// Fits `y = slope * x + intercept`.
    ///
    /// Constant `x` gives slope 0 (the line is the mean of `y`); constant
    /// `y` gives R² 0. Slices of unequal length are truncated to the
    /// shorter one.
    pub fn fit(x: &[f64], y: &[f64]) -> Self {
        let n = x.len().min(y.len());
        if n == 0 {
            return Regression::default();
        }
        let (x, y) = (&x[..n], &y[..n]);
        let x_mean = mean(x);
        let y_mean = mean(y);

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (xi, yi) in x.iter().zip(y) {
            sxy += (xi - x_mean) * (yi - y_mean);
            sxx += (xi - x_mean).powi(2);
        }
        let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
        let intercept = y_mean - slope * x_mean;

        let mut ss_tot = 0.0;
        let mut ss_res = 0.0;
        for (xi, yi) in x.iter().zip(y) {
            ss_tot += (yi - y_mean).powi(2);
            ss_res += (yi - (slope * xi + intercept)).powi(2);
        }
        let r_squared = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };
        let standard_error = if n > 2 {
            (ss_res / (n - 2) as f64).sqrt()
        } else {
            0.0
        };

        Regression {
            slope,
            intercept,
            r_squared,
            standard_error,
            n,
        }
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn residuals(&self, x: &[f64], y: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(y)
            .map(|(xi, yi)| yi - self.predict(*xi))
            .collect()
    }
}
