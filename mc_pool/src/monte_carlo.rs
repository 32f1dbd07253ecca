use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::fmt;
use tracing::warn;

use crate::error::{Error, Result};

/// One unit of work: draw `samples` standard-normal values seeded by `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleTask {
    pub index: u64,
    pub samples: i64,
}

/// Mean of the draws for the task with the same index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleMean {
    pub index: u64,
    pub mean: f64,
}

impl fmt::Display for SampleMean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.index, self.mean)
    }
}

/// Computes the sample mean for `task`.
///
/// The generator is private to the call and seeded from the index alone, so
/// the result does not depend on which worker runs it or when. Zero draws
/// give a NaN mean; a negative count is an error.
pub fn sample_mean(task: SampleTask) -> Result<SampleMean> {
    let count = usize::try_from(task.samples).map_err(|_| Error::InvalidSampleCount {
        index: task.index,
        samples: task.samples,
    })?;
    if count == 0 {
        warn!(index = task.index, "mean of zero samples is undefined");
        return Ok(SampleMean {
            index: task.index,
            mean: f64::NAN,
        });
    }

    let mut rng = StdRng::seed_from_u64(task.index);
    let mut sum = 0.0;
    for _ in 0..count {
        let x: f64 = rng.sample(StandardNormal);
        sum += x;
    }

    Ok(SampleMean {
        index: task.index,
        mean: sum / count as f64,
    })
}

pub fn build_tasks(task_count: u64, samples: i64) -> Vec<SampleTask> {
    (0..task_count)
        .map(|index| SampleTask { index, samples })
        .collect()
}

/// Renders results as `[(0, m0), (1, m1), ...]`.
pub fn format_results(results: &[SampleMean]) -> String {
    let items: Vec<String> = results.iter().map(|r| r.to_string()).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_index_same_mean() {
        let task = SampleTask { index: 7, samples: 500 };
        let a = sample_mean(task).unwrap();
        let b = sample_mean(task).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_index_different_stream() {
        let a = sample_mean(SampleTask { index: 0, samples: 100 }).unwrap();
        let b = sample_mean(SampleTask { index: 1, samples: 100 }).unwrap();
        assert_ne!(a.mean, b.mean);
    }

    #[test]
    fn mean_is_near_zero() {
        // std error is 1/sqrt(1000) ~ 0.032
        for index in 0..5 {
            let r = sample_mean(SampleTask { index, samples: 1000 }).unwrap();
            assert_eq!(r.index, index);
            assert!(r.mean.is_finite());
            assert!(r.mean.abs() < 0.2, "mean {} too far from 0", r.mean);
        }
    }

    #[test]
    fn zero_samples_give_nan() {
        let r = sample_mean(SampleTask { index: 4, samples: 0 }).unwrap();
        assert_eq!(r.index, 4);
        assert!(r.mean.is_nan());
    }

    #[test]
    fn rejects_negative_counts() {
        for samples in [-1, -1000, i64::MIN] {
            match sample_mean(SampleTask { index: 3, samples }) {
                Err(Error::InvalidSampleCount { index: 3, samples: s }) => assert_eq!(s, samples),
                other => panic!("expected InvalidSampleCount, got {:?}", other),
            }
        }
    }

    #[test]
    fn build_tasks_indexes_from_zero() {
        let tasks = build_tasks(3, 10);
        assert_eq!(
            tasks,
            vec![
                SampleTask { index: 0, samples: 10 },
                SampleTask { index: 1, samples: 10 },
                SampleTask { index: 2, samples: 10 },
            ]
        );
        assert!(build_tasks(0, 10).is_empty());
    }

    #[test]
    fn formats_as_list_of_pairs() {
        let results = [
            SampleMean { index: 0, mean: 0.5 },
            SampleMean { index: 1, mean: -0.25 },
        ];
        assert_eq!(format_results(&results), "[(0, 0.5), (1, -0.25)]");
        assert_eq!(format_results(&[]), "[]");
    }
}
