//! Rolling statistics and technical indicators over daily close series.
//!
//! Every windowed statistic returns `Vec<Option<f64>>` aligned one-to-one
//! with its input: an entry is `None` when the lookback has insufficient
//! history, and undefined arithmetic (zero denominators) yields `None`
//! instead of a non-finite value. A statistic with window `w` is reported
//! from index `w` onward, requiring a full window of *prior* history, so
//! the longest lookback determines exactly how many head rows the feature
//! builder drops.

/// Simple percentage change over `periods` steps.
///
/// `None` for the first `periods` entries and wherever the base price is zero.
pub fn pct_change(values: &[f64], periods: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if i < periods {
                return None;
            }
            let base = values[i - periods];
            if base == 0.0 {
                None
            } else {
                Some(v / base - 1.0)
            }
        })
        .collect()
}

/// Rolling aggregate over an already-optional series.
///
/// Entry `t` covers `values[t-window+1..=t]` and is `None` when `t < window`
/// or when any covered entry is `None`.
fn rolling<F>(values: &[Option<f64>], window: usize, agg: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = Vec::with_capacity(values.len());
    let mut buf = Vec::with_capacity(window);
    for t in 0..values.len() {
        if t < window || window == 0 {
            out.push(None);
            continue;
        }
        buf.clear();
        let mut complete = true;
        for v in &values[t + 1 - window..=t] {
            match v {
                Some(x) => buf.push(*x),
                None => {
                    complete = false;
                    break;
                }
            }
        }
        out.push(if complete { Some(agg(&buf)) } else { None });
    }
    out
}

fn lift(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|&v| Some(v)).collect()
}

/// Rolling mean of a fully-defined series.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(&lift(values), window, |w| {
        w.iter().sum::<f64>() / w.len() as f64
    })
}

/// Rolling maximum of a fully-defined series.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(&lift(values), window, |w| {
        w.iter().cloned().fold(f64::MIN, f64::max)
    })
}

/// Rolling minimum of a fully-defined series.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(&lift(values), window, |w| {
        w.iter().cloned().fold(f64::MAX, f64::min)
    })
}

/// Rolling mean over a series that may itself carry undefined entries,
/// e.g. a return series whose first observation does not exist.
pub fn rolling_mean_opt(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Exponential moving average with `alpha = 2 / (span + 1)`, seeded with the
/// first observation. Defined at every index, matching an `adjust=false`
/// recursive EMA.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    out.push(prev);
    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// Relative Strength Index with rolling-mean smoothing.
///
/// Day-over-day differences are split into gains and sign-flipped losses,
/// both rolling-averaged over `window`; RSI = 100 − 100/(1 + gain/loss).
/// When the loss average is exactly zero the output is capped at 100 (the
/// RS → ∞ limit) rather than reported undefined. The first `window`
/// entries are `None`.
pub fn rsi(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut gains: Vec<Option<f64>> = Vec::with_capacity(values.len());
    let mut losses: Vec<Option<f64>> = Vec::with_capacity(values.len());
    gains.push(None);
    losses.push(None);
    for w in values.windows(2) {
        let delta = w[1] - w[0];
        gains.push(Some(delta.max(0.0)));
        losses.push(Some((-delta).max(0.0)));
    }

    let mean_gain = rolling_mean_opt(&gains, window);
    let mean_loss = rolling_mean_opt(&losses, window);

    mean_gain
        .iter()
        .zip(mean_loss.iter())
        .map(|(g, l)| match (g, l) {
            (Some(g), Some(l)) => {
                if *l == 0.0 {
                    Some(100.0)
                } else {
                    let rs = g / l;
                    Some(100.0 - 100.0 / (1.0 + rs))
                }
            }
            _ => None,
        })
        .collect()
}

/// MACD line, signal line and histogram.
///
/// `macd = EMA(fast) − EMA(slow)`, `signal = EMA(macd, signal_span)`,
/// `histogram = macd − signal`. All three are defined from index 0.
pub fn macd(
    values: &[f64],
    fast: usize,
    slow: usize,
    signal_span: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let ema_fast = ema(values, fast);
    let ema_slow = ema(values, slow);
    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema(&macd_line, signal_span);
    let histogram: Vec<f64> = macd_line
        .iter()
        .zip(signal.iter())
        .map(|(m, s)| m - s)
        .collect();
    (macd_line, signal, histogram)
}
