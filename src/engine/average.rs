//! Trailing moving averages over dense daily series, plain and
//! ratio-of-two-series forms. Both use an incremental running sum so the
//! whole pass stays O(n) regardless of window size.

use super::error::EngineError;

/// What to do when a denominator window sums to zero in
/// [`moving_average_ratio`]. Never divided silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroDenominator {
    /// Emit 0.0 for that window.
    AsZero,
    /// Fail the whole computation.
    Reject,
}

/// Trailing average of `series` over `window` days. Output entry `i`
/// averages `series[i..i + window]`; output length is
/// `series.len() - window + 1`.
pub fn moving_average(series: &[f64], window: usize) -> Result<Vec<f64>, EngineError> {
    validate(window, series.len())?;

    let mut averages = Vec::with_capacity(series.len() - window + 1);
    let mut sum: f64 = series[..window].iter().sum();
    averages.push(sum / window as f64);

    for i in window..series.len() {
        sum += series[i] - series[i - window];
        averages.push(sum / window as f64);
    }

    Ok(averages)
}

/// Trailing ratio of window sums: entry `i` is
/// `sum(numerator[i..i+window]) / sum(denominator[i..i+window])`, a ratio
/// of totals rather than an average of per-day ratios.
pub fn moving_average_ratio(
    numerator: &[f64],
    denominator: &[f64],
    window: usize,
    zero_policy: ZeroDenominator,
) -> Result<Vec<f64>, EngineError> {
    if numerator.len() != denominator.len() {
        return Err(EngineError::LengthMismatch {
            numerator: numerator.len(),
            denominator: denominator.len(),
        });
    }
    validate(window, numerator.len())?;

    let mut ratios = Vec::with_capacity(numerator.len() - window + 1);
    let mut num_sum: f64 = numerator[..window].iter().sum();
    let mut den_sum: f64 = denominator[..window].iter().sum();
    ratios.push(ratio_step(num_sum, den_sum, 0, zero_policy)?);

    for i in window..numerator.len() {
        num_sum += numerator[i] - numerator[i - window];
        den_sum += denominator[i] - denominator[i - window];
        ratios.push(ratio_step(num_sum, den_sum, i - window + 1, zero_policy)?);
    }

    Ok(ratios)
}

fn ratio_step(
    num_sum: f64,
    den_sum: f64,
    index: usize,
    zero_policy: ZeroDenominator,
) -> Result<f64, EngineError> {
    if den_sum == 0.0 {
        return match zero_policy {
            ZeroDenominator::AsZero => Ok(0.0),
            ZeroDenominator::Reject => Err(EngineError::ZeroDenominator { index }),
        };
    }
    Ok(num_sum / den_sum)
}

fn validate(window: usize, len: usize) -> Result<(), EngineError> {
    if window < 1 {
        return Err(EngineError::EmptyWindow);
    }
    if len < window {
        return Err(EngineError::WindowTooLarge { window, len });
    }
    Ok(())
}
