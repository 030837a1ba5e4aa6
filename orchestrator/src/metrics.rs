use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Prometheus metrics for pipeline runs, owned by one registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    runs: IntCounterVec,
    stage_invocations: IntCounterVec,
    stage_latency: HistogramVec,
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let runs = IntCounterVec::new(
            Opts::new("report_runs_total", "Report pipeline runs by outcome"),
            &["outcome"],
        )?;
        let stage_invocations = IntCounterVec::new(
            Opts::new(
                "report_stage_invocations_total",
                "Agent stage invocations by stage and outcome",
            ),
            &["stage", "outcome"],
        )?;
        let stage_latency = HistogramVec::new(
            HistogramOpts::new(
                "report_stage_duration_seconds",
                "Wall time spent in each agent stage",
            )
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
            &["stage"],
        )?;

        registry.register(Box::new(runs.clone()))?;
        registry.register(Box::new(stage_invocations.clone()))?;
        registry.register(Box::new(stage_latency.clone()))?;

        Ok(Self {
            registry,
            runs,
            stage_invocations,
            stage_latency,
        })
    }

    pub fn record_run(&self, success: bool) {
        self.runs.with_label_values(&[outcome(success)]).inc();
    }

    pub fn observe_stage(&self, stage: &str, success: bool, elapsed: Duration) {
        self.stage_invocations
            .with_label_values(&[stage, outcome(success)])
            .inc();
        self.stage_latency
            .with_label_values(&[stage])
            .observe(elapsed.as_secs_f64());
    }

    pub fn run_count(&self, success: bool) -> u64 {
        self.runs.with_label_values(&[outcome(success)]).get()
    }

    pub fn stage_count(&self, stage: &str, success: bool) -> u64 {
        self.stage_invocations
            .with_label_values(&[stage, outcome(success)])
            .get()
    }

    /// Text exposition format plus its content type.
    pub fn encode(&self) -> Result<(Vec<u8>, String), prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = vec![];
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok((buffer, encoder.format_type().to_string()))
    }
}
