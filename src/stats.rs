use serde::Serialize;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Five-number summary plus mean, as a box plot would show it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalarySummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

impl SalarySummary {
    pub fn from_samples(values: &[f64]) -> Option<Self> {
        Some(Self {
            count: values.len(),
            min: quantile(values, 0.0)?,
            q1: quantile(values, 0.25)?,
            median: median(values)?,
            q3: quantile(values, 0.75)?,
            max: quantile(values, 1.0)?,
            mean: mean(values)?,
        })
    }
}
