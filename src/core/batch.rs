use crate::core::matcher::Matcher;
use crate::domain::model::{CandidateNode, CustomerRecord, RecommendationResult};
use crate::utils::error::Result;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 批次進度 (已處理 / 總數)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub processed: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.processed as f64 * 100.0 / self.total as f64
        }
    }
}

/// Runs the matcher over a customer batch on a dedicated rayon pool.
pub struct BatchRunner {
    matcher: Matcher,
    thread_pool: rayon::ThreadPool,
    progress_interval: usize,
}

impl BatchRunner {
    /// `threads == 0` sizes the pool to the available cores.
    pub fn new(matcher: Matcher, threads: usize, progress_interval: usize) -> Result<Self> {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("odp-matcher-{}", i))
            .build()?;

        Ok(Self {
            matcher,
            thread_pool,
            progress_interval: progress_interval.max(1),
        })
    }

    pub fn threads(&self) -> usize {
        self.thread_pool.current_num_threads()
    }

    /// Results come back in customer order. `on_progress` fires once per
    /// finished chunk of `progress_interval` customers.
    pub fn run<F>(
        &self,
        customers: &[CustomerRecord],
        catalog: &[CandidateNode],
        on_progress: F,
    ) -> Vec<RecommendationResult>
    where
        F: Fn(BatchProgress) + Send + Sync,
    {
        let total = customers.len();
        let processed = AtomicUsize::new(0);

        let chunks: Vec<Vec<RecommendationResult>> = self.thread_pool.install(|| {
            customers
                .par_chunks(self.progress_interval)
                .map(|chunk| {
                    let results: Vec<_> = chunk
                        .iter()
                        .map(|customer| self.matcher.recommend(customer, catalog))
                        .collect();

                    let done = processed.fetch_add(chunk.len(), Ordering::Relaxed) + chunk.len();
                    on_progress(BatchProgress {
                        processed: done,
                        total,
                    });
                    results
                })
                .collect()
        });

        chunks.into_iter().flatten().collect()
    }
}
