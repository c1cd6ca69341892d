use serde::{Deserialize, Serialize};

/// Count, mean and summed squared deviation of a sample. Mergeable without
/// revisiting the samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    pub count: u64,
    pub mean: f64,
    pub m2: f64,
}

impl Moments {
    /// Two passes: mean first, then squared deviations from it.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let m2 = samples.iter().map(|x| (x - mean).powi(2)).sum();
        Self {
            count: samples.len() as u64,
            mean,
            m2,
        }
    }

    /// Sums of consecutive `group` samples; a trailing partial group is dropped.
    pub fn from_grouped(samples: &[f64], group: usize) -> Self {
        if group == 0 {
            return Self::default();
        }
        let sums: Vec<f64> = samples
            .chunks_exact(group)
            .map(|chunk| chunk.iter().sum())
            .collect();
        Self::from_samples(&sums)
    }

    /// Chan et al. pairwise combination.
    pub fn merge(&mut self, other: &Moments) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;
        self.mean += delta * n_b / n;
        self.m2 += other.m2 + delta * delta * n_a * n_b / n;
        self.count += other.count;
    }

    /// Population variance.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Standard error of the mean using the sample variance.
    pub fn std_error(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let sample_variance = self.m2 / (self.count - 1) as f64;
        (sample_variance / self.count as f64).sqrt()
    }
}
