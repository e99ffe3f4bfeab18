use std::time::Duration;

use gremlin_load::{LoadKind, LoadMetrics, LoadOutcome};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

/// Load metrics recorded into a dedicated Prometheus registry.
///
/// Cheap to clone; clones share the same collectors.
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    tasks_started: IntCounterVec,
    runs: IntCounterVec,
    duration: HistogramVec,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Register the collectors on an existing registry.
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let tasks_started = IntCounterVec::new(
            Opts::new(
                "gremlin_load_tasks_started_total",
                "Number of load workers started",
            ),
            &["kind"],
        )?;
        let runs = IntCounterVec::new(
            Opts::new("gremlin_load_runs_total", "Number of finished load runs"),
            &["kind", "outcome"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "gremlin_load_duration_seconds",
                "Wall time of load runs in seconds",
            )
            .buckets(vec![
                0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0, 900.0,
            ]),
            &["kind"],
        )?;

        registry.register(Box::new(tasks_started.clone()))?;
        registry.register(Box::new(runs.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            registry,
            tasks_started,
            runs,
            duration,
        })
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Encode every collector in the text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl LoadMetrics for PrometheusMetrics {
    fn record_started(&self, kind: LoadKind, tasks: usize) {
        self.tasks_started
            .with_label_values(&[kind.as_str()])
            .inc_by(tasks as u64);
    }

    fn record_finished(&self, kind: LoadKind, outcome: LoadOutcome, elapsed: Duration) {
        self.runs
            .with_label_values(&[kind.as_str(), outcome.as_str()])
            .inc();
        self.duration
            .with_label_values(&[kind.as_str()])
            .observe(elapsed.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn started_tasks_accumulate_per_kind() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_started(LoadKind::Cpu, 4);
        metrics.record_started(LoadKind::Cpu, 2);
        metrics.record_started(LoadKind::Io, 10);

        assert_eq!(metrics.tasks_started.with_label_values(&["cpu"]).get(), 6);
        assert_eq!(metrics.tasks_started.with_label_values(&["io"]).get(), 10);
    }

    #[test]
    fn finished_runs_are_labelled_by_outcome() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_finished(LoadKind::Io, LoadOutcome::Cancelled, Duration::from_millis(20));
        metrics.record_finished(LoadKind::Io, LoadOutcome::Completed, Duration::from_secs(1));

        assert_eq!(
            metrics.runs.with_label_values(&["io", "cancelled"]).get(),
            1
        );
        assert_eq!(
            metrics.duration.with_label_values(&["io"]).get_sample_count(),
            2
        );
    }

    #[test]
    fn render_emits_text_exposition() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_finished(LoadKind::Memory, LoadOutcome::Rejected, Duration::ZERO);

        let body = metrics.render().unwrap();
        assert!(body.contains("gremlin_load_runs_total{kind=\"memory\",outcome=\"rejected\"} 1"));
        assert!(body.contains("# TYPE gremlin_load_duration_seconds histogram"));
    }

    #[test]
    fn registering_twice_on_one_registry_fails() {
        let registry = Registry::new();
        PrometheusMetrics::with_registry(registry.clone()).unwrap();
        assert!(PrometheusMetrics::with_registry(registry).is_err());
    }
}
