use crate::core::{BatchSummary, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

pub struct BatchEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> BatchEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting batch run");
        self.monitor.log_phase("Start");

        // Extract
        let resumes = self.pipeline.extract().await?;
        tracing::info!("📥 Selected {} resumes", resumes.len());
        self.monitor.log_phase("Extract");

        // Transform
        let output = self.pipeline.transform(resumes).await?;
        tracing::info!(
            "🔧 Processed {} resumes ({} failed)",
            output.processed(),
            output.failed()
        );
        self.monitor.log_phase("Transform");

        // Load
        let location = self.pipeline.load(output).await?;
        tracing::info!("💾 Results written to {}", location);
        self.monitor.log_phase("Load");
        self.monitor.log_summary();

        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Resume;
    use std::sync::Mutex;

    struct Counted(usize);

    impl BatchSummary for Counted {
        fn processed(&self) -> usize {
            self.0
        }

        fn failed(&self) -> usize {
            0
        }
    }

    struct RecordingPipeline {
        phases: Mutex<Vec<&'static str>>,
    }

    #[async_trait::async_trait]
    impl Pipeline for RecordingPipeline {
        type Output = Counted;

        async fn extract(&self) -> Result<Vec<Resume>> {
            self.phases.lock().unwrap().push("extract");
            Ok(vec![Resume {
                id: "1".to_string(),
                text: "resume".to_string(),
                html: String::new(),
            }])
        }

        async fn transform(&self, data: Vec<Resume>) -> Result<Counted> {
            self.phases.lock().unwrap().push("transform");
            Ok(Counted(data.len()))
        }

        async fn load(&self, output: Counted) -> Result<String> {
            self.phases.lock().unwrap().push("load");
            Ok(format!("memory://{}", output.processed()))
        }
    }

    #[tokio::test]
    async fn test_engine_runs_phases_in_order() {
        let engine = BatchEngine::new(RecordingPipeline {
            phases: Mutex::new(Vec::new()),
        });

        let location = engine.run().await.unwrap();

        assert_eq!(location, "memory://1");
        assert_eq!(
            *engine.pipeline.phases.lock().unwrap(),
            vec!["extract", "transform", "load"]
        );
    }
}
