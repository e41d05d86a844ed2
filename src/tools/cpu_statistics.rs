use crate::tools::cpu_sampler::CpuSample;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuStatistics {
    pub average: f64,
    pub maximum: f64,
    pub minimum: f64,
    pub sample_count: usize,
}

impl CpuStatistics {
    /// 空序列不產生統計
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let sum: f64 = values.iter().sum();
        let maximum = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let minimum = values.iter().copied().fold(f64::INFINITY, f64::min);

        Some(Self {
            average: sum / values.len() as f64,
            maximum,
            minimum,
            sample_count: values.len(),
        })
    }

    #[must_use]
    pub fn from_samples(samples: &[CpuSample]) -> Option<Self> {
        let values: Vec<f64> = samples.iter().map(|s| s.cpu_percent).collect();
        Self::from_values(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_empty_has_no_statistics() {
        assert!(CpuStatistics::from_values(&[]).is_none());
        assert!(CpuStatistics::from_samples(&[]).is_none());
    }

    #[test]
    fn test_statistics_match_sequence() {
        let stats = CpuStatistics::from_values(&[12.5, 40.0, 3.25, 20.25]).unwrap();
        assert!((stats.average - 19.0).abs() < 1e-9);
        assert_eq!(stats.maximum, 40.0);
        assert_eq!(stats.minimum, 3.25);
        assert_eq!(stats.sample_count, 4);
    }

    #[test]
    fn test_single_sample() {
        let sample = CpuSample {
            index: 1,
            elapsed: Duration::from_secs(5),
            cpu_percent: 17.0,
        };
        let stats = CpuStatistics::from_samples(&[sample]).unwrap();
        assert_eq!(stats.average, 17.0);
        assert_eq!(stats.maximum, 17.0);
        assert_eq!(stats.minimum, 17.0);
    }
}
