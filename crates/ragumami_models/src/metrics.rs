//! Metrics for generation backend calls.
//!
//! Instruments are created from the global OpenTelemetry meter and are no-ops
//! until the binary installs a meter provider.

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::OnceLock;

static METRICS: OnceLock<GenerationMetrics> = OnceLock::new();

/// Counters and latency for calls to the model backend, labelled by model and
/// operation ("generate", "embed").
#[derive(Clone)]
pub struct GenerationMetrics {
    /// Meter handle kept alive for metric instruments
    _meter: Meter,
    /// Logical calls that succeeded
    pub requests: Counter<u64>,
    /// Retries scheduled after a 5xx
    pub retries: Counter<u64>,
    /// Logical calls that ended in a timeout
    pub timeouts: Counter<u64>,
    /// Logical calls that ended without a 2xx
    pub failures: Counter<u64>,
    /// Logical call duration in seconds, retries included, labelled by outcome
    pub duration: Histogram<f64>,
}

impl GenerationMetrics {
    fn init() -> Self {
        let meter = global::meter("ragumami_generation");

        Self {
            _meter: meter.clone(),
            requests: meter
                .u64_counter("generation.requests")
                .with_description("Successful generation calls")
                .build(),
            retries: meter
                .u64_counter("generation.retries")
                .with_description("Retries scheduled after a server error")
                .build(),
            timeouts: meter
                .u64_counter("generation.timeouts")
                .with_description("Generation calls that ended in a timeout")
                .build(),
            failures: meter
                .u64_counter("generation.failures")
                .with_description("Generation calls that ended without a response")
                .build(),
            duration: meter
                .f64_histogram("generation.duration")
                .with_unit("s")
                .with_description("Generation call duration by outcome")
                .build(),
        }
    }

    /// Get the global generation metrics instance.
    pub fn get() -> &'static Self {
        METRICS.get_or_init(Self::init)
    }

    fn labels(model: &str, operation: &str) -> [KeyValue; 2] {
        [
            KeyValue::new("model", model.to_string()),
            KeyValue::new("operation", operation.to_string()),
        ]
    }

    fn outcome_labels(model: &str, operation: &str, outcome: &'static str) -> [KeyValue; 3] {
        let [model, operation] = Self::labels(model, operation);
        [model, operation, KeyValue::new("outcome", outcome)]
    }

    /// Record a successful logical call.
    pub fn record_success(&self, model: &str, operation: &str, duration_secs: f64) {
        self.requests.add(1, &Self::labels(model, operation));
        self.duration
            .record(duration_secs, &Self::outcome_labels(model, operation, "success"));
    }

    /// Record a retry scheduled after `status`.
    pub fn record_retry(&self, model: &str, operation: &str, status: u16) {
        let [model, operation] = Self::labels(model, operation);
        self.retries.add(
            1,
            &[model, operation, KeyValue::new("status", i64::from(status))],
        );
    }

    /// Record a failed logical call. `outcome` is a short label such as
    /// "timeout" or "retry_exhausted".
    pub fn record_failure(
        &self,
        model: &str,
        operation: &str,
        outcome: &'static str,
        duration_secs: f64,
    ) {
        if outcome == "timeout" {
            self.timeouts.add(1, &Self::labels(model, operation));
        }
        let labels = Self::outcome_labels(model, operation, outcome);
        self.failures.add(1, &labels);
        self.duration.record(duration_secs, &labels);
    }
}

impl Default for GenerationMetrics {
    fn default() -> Self {
        Self::get().clone()
    }
}
