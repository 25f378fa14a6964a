//! Forecasting methods over a monthly series
//!
//! All functions are pure and total: a zero denominator yields 0, never NaN.

/// Least-squares line through `(i, amounts[i])`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Value of the line at index `x`
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares of amount against month index
pub fn linear_fit(amounts: &[f64]) -> LinearFit {
    let n = amounts.len() as f64;
    if amounts.is_empty() {
        return LinearFit {
            slope: 0.0,
            intercept: 0.0,
        };
    }

    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, &y) in amounts.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return LinearFit {
            slope: 0.0,
            intercept: 0.0,
        };
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    LinearFit { slope, intercept }
}

/// Linear projection one step past the end of the series
pub fn linear_projection(amounts: &[f64]) -> f64 {
    linear_fit(amounts).at(amounts.len() as f64)
}

/// Exponential moving average seeded with the first value
pub fn ema(amounts: &[f64], alpha: f64) -> f64 {
    let Some((&first, rest)) = amounts.split_first() else {
        return 0.0;
    };

    rest.iter()
        .fold(first, |acc, &value| alpha * value + (1.0 - alpha) * acc)
}

/// Average with linearly increasing weights `1.0, 1.0 + step, ...`
pub fn weighted_average(amounts: &[f64], step: f64) -> f64 {
    let (weighted_sum, weight_sum) = amounts.iter().enumerate().fold(
        (0.0, 0.0),
        |(ws, w), (i, &value)| {
            let weight = 1.0 + step * i as f64;
            (ws + weight * value, w + weight)
        },
    );

    if weight_sum == 0.0 {
        0.0
    } else {
        weighted_sum / weight_sum
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
