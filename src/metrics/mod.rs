use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

// ============================================================================
// Metrics Module - Prometheus metrics for command processing
// ============================================================================
//
// Provides metrics for:
// - Commands handled, by command type
// - Rejections, by command type and error class
// - Events appended, by event type
// - Optimistic concurrency conflicts and retries
//
// Exposition is left to the embedding service; `encode` renders the text format.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub commands_processed: IntCounterVec,
    pub commands_rejected: IntCounterVec,
    pub command_duration: HistogramVec,

    pub events_appended: IntCounterVec,

    pub concurrency_conflicts: IntCounter,
    pub retry_attempts_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let commands_processed = IntCounterVec::new(
            Opts::new("commands_processed_total", "Total commands accepted and persisted"),
            &["command"],
        )?;
        registry.register(Box::new(commands_processed.clone()))?;

        let commands_rejected = IntCounterVec::new(
            Opts::new("commands_rejected_total", "Total commands that failed"),
            &["command", "class"],
        )?;
        registry.register(Box::new(commands_rejected.clone()))?;

        let command_duration = HistogramVec::new(
            HistogramOpts::new("command_duration_seconds", "Command handling duration")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["command"],
        )?;
        registry.register(Box::new(command_duration.clone()))?;

        let events_appended = IntCounterVec::new(
            Opts::new("events_appended_total", "Total events appended to the event store"),
            &["event_type"],
        )?;
        registry.register(Box::new(events_appended.clone()))?;

        let concurrency_conflicts = IntCounter::new(
            "concurrency_conflicts_total",
            "Appends refused because another writer advanced the stream",
        )?;
        registry.register(Box::new(concurrency_conflicts.clone()))?;

        let retry_attempts_total = IntCounterVec::new(
            Opts::new("retry_attempts_total", "Total retry attempts"),
            &["command", "attempt"],
        )?;
        registry.register(Box::new(retry_attempts_total.clone()))?;

        Ok(Self {
            registry,
            commands_processed,
            commands_rejected,
            command_duration,
            events_appended,
            concurrency_conflicts,
            retry_attempts_total,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record the final outcome of one command; `failure_class` is `None` on success
    pub fn record_command(&self, command: &str, duration_secs: f64, failure_class: Option<&str>) {
        match failure_class {
            None => self.commands_processed.with_label_values(&[command]).inc(),
            Some(class) => self.commands_rejected.with_label_values(&[command, class]).inc(),
        }
        self.command_duration.with_label_values(&[command]).observe(duration_secs);
    }

    pub fn record_event_appended(&self, event_type: &str) {
        self.events_appended.with_label_values(&[event_type]).inc();
    }

    pub fn record_conflict(&self) {
        self.concurrency_conflicts.inc();
    }

    pub fn record_retry_attempt(&self, command: &str, attempt: u32) {
        let attempt = attempt.to_string();
        self.retry_attempts_total.with_label_values(&[command, attempt.as_str()]).inc();
    }

    /// Prometheus text exposition of every registered metric
    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        // Vec metrics only appear once a label set is used
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_record_command_outcomes() {
        let metrics = Metrics::new().unwrap();
        metrics.record_command("CreateUser", 0.001, None);
        metrics.record_command("CreateUser", 0.002, None);
        metrics.record_command("AddShortener", 0.001, Some("rejected"));

        assert_eq!(metrics.commands_processed.with_label_values(&["CreateUser"]).get(), 2);
        assert_eq!(
            metrics.commands_rejected.with_label_values(&["AddShortener", "rejected"]).get(),
            1
        );
        assert_eq!(
            metrics.command_duration.with_label_values(&["CreateUser"]).get_sample_count(),
            2
        );
    }

    #[test]
    fn test_record_conflicts_and_retries() {
        let metrics = Metrics::new().unwrap();
        metrics.record_conflict();
        metrics.record_retry_attempt("AddShortener", 2);
        metrics.record_retry_attempt("AddShortener", 3);

        assert_eq!(metrics.concurrency_conflicts.get(), 1);
        assert_eq!(
            metrics.retry_attempts_total.with_label_values(&["AddShortener", "2"]).get(),
            1
        );
    }

    #[test]
    fn test_encode_text_format() {
        let metrics = Metrics::new().unwrap();
        metrics.record_event_appended("UserCreated");

        let text = metrics.encode().unwrap();
        assert!(text.contains("events_appended_total{event_type=\"UserCreated\"} 1"));
        assert!(text.contains("concurrency_conflicts_total 0"));
    }
}
