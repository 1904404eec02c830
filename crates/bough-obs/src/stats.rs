//! Summary statistics over small sample sets.

/// Count, sum, mean, population standard deviation, min and max.
///
/// Every field of the summary of an empty set is 0.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Summary {
    /// Number of samples.
    pub count: usize,
    /// Sum of samples.
    pub sum: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub stddev: f64,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
}

impl Summary {
    /// Summarize `samples` in one pass (Welford).
    pub fn of<I: IntoIterator<Item = f64>>(samples: I) -> Self {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut mean = 0.0;
        let mut m2 = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for x in samples {
            count += 1;
            sum += x;
            let delta = x - mean;
            mean += delta / count as f64;
            m2 += delta * (x - mean);
            min = min.min(x);
            max = max.max(x);
        }
        if count == 0 {
            return Self::default();
        }
        Self {
            count,
            sum,
            mean,
            stddev: (m2 / count as f64).sqrt(),
            min,
            max,
        }
    }
}

/// `num / den`, or 0 when `den` is 0.
pub fn ratio_or_zero(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}
