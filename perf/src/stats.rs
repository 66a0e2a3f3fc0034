//! Descriptive statistics over sample series.

use rolling_stats::Stats;

use crate::error::Error;
use crate::schema::LatencySummary;

/// Compute the `p`th percentile of `values`, interpolating linearly between
/// the closest ranks
pub fn percentile(values: &[f64], p: f64) -> Result<f64, Error> {
    if values.is_empty() {
        return Err(Error::EmptySeries);
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(Error::InvalidPercentile(p));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;

    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

pub fn median(values: &[f64]) -> Result<f64, Error> {
    percentile(values, 50.0)
}

/// Absolute differences between consecutive samples
pub fn jitter(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| (w[1] - w[0]).abs()).collect()
}

/// Population standard deviation around `mean`
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    let n = values.len() as f64;
    let v = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    v.sqrt()
}

fn running(values: &[f64]) -> Stats<f64> {
    let mut s = Stats::new();
    for v in values {
        s.update(*v);
    }
    s
}

/// Reduce the latency samples of one payload to a summary row
pub fn summarise_latency(payload: u64, samples: &[f64]) -> Result<LatencySummary, Error> {
    if samples.is_empty() {
        return Err(Error::EmptySeries);
    }

    let latency = running(samples);

    // Single samples have no jitter
    let jitter = jitter(samples);
    let (mean_jitter, max_jitter) = match jitter.is_empty() {
        true => (0.0, 0.0),
        false => {
            let j = running(&jitter);
            (j.mean, j.max)
        },
    };

    Ok(LatencySummary {
        bytes: payload,
        samples: samples.len(),
        max: latency.max,
        min: latency.min,
        mean: latency.mean,
        median: median(samples)?,
        stdev: std_dev(samples, latency.mean),
        mean_jitter,
        max_jitter,
        p90: percentile(samples, 90.0)?,
        p99: percentile(samples, 99.0)?,
        p9999: percentile(samples, 99.99)?,
    })
}
