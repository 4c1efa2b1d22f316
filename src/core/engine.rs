use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct RecommendationEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> RecommendationEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting ODP recommendation run");
        self.monitor.log_stats("Start");

        // Extract
        let input = self.pipeline.extract().await?;
        tracing::info!(
            "Loaded {} ODP candidates and {} customers",
            input.catalog.len(),
            input.customers.len()
        );
        self.monitor.log_stats("Extract");

        // Transform
        let output = self.pipeline.transform(input).await?;
        let summary = &output.summary;
        tracing::info!(
            "Matched {} customers: ready={}, potential_upgrade={}, no_candidate={}, invalid={}",
            summary.total(),
            summary.ready,
            summary.potential_upgrade_needed,
            summary.no_candidate_available,
            summary.invalid_coordinates
        );
        self.monitor.log_stats("Transform");

        // Load
        let output_path = self.pipeline.load(output).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
