use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

/// Central metrics registry for the monitor
pub struct MetricsRegistry {
    registry: Registry,

    // HTTP Metrics
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,

    // Probe Metrics
    pub checks_total: IntCounterVec,
    pub check_duration_seconds: HistogramVec,

    // Insight Metrics
    pub insights_total: IntCounterVec,
    pub insight_failures_total: IntCounterVec,

    // Pipeline Metrics
    pub stream_dropped_total: IntCounter,
    pub persistence_failures_total: IntCounterVec,
    pub monitored_endpoints: Gauge,
}

impl MetricsRegistry {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        let registry = Registry::new();

        // HTTP Metrics
        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests served").namespace("monitor"),
            &["method", "endpoint", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request duration")
                .namespace("monitor")
                .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0]),
            &["method", "endpoint"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        // Probe Metrics
        let checks_total = IntCounterVec::new(
            Opts::new("checks_total", "Endpoint probes by outcome").namespace("monitor"),
            &["outcome"],
        )?;
        registry.register(Box::new(checks_total.clone()))?;

        let check_duration_seconds = HistogramVec::new(
            HistogramOpts::new("check_duration_seconds", "Endpoint probe wall-clock time")
                .namespace("monitor")
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(check_duration_seconds.clone()))?;

        // Insight Metrics
        let insights_total = IntCounterVec::new(
            Opts::new("insights_total", "Insights produced by source").namespace("monitor"),
            &["source"],
        )?;
        registry.register(Box::new(insights_total.clone()))?;

        let insight_failures_total = IntCounterVec::new(
            Opts::new(
                "insight_failures_total",
                "Completion-service failures that fell back to rule-based insights",
            )
            .namespace("monitor"),
            &["reason"],
        )?;
        registry.register(Box::new(insight_failures_total.clone()))?;

        // Pipeline Metrics
        let stream_dropped_total = IntCounter::with_opts(
            Opts::new(
                "stream_dropped_total",
                "Polling results dropped because the result stream was full",
            )
            .namespace("monitor"),
        )?;
        registry.register(Box::new(stream_dropped_total.clone()))?;

        let persistence_failures_total = IntCounterVec::new(
            Opts::new("persistence_failures_total", "Failed result writes").namespace("monitor"),
            &["path"],
        )?;
        registry.register(Box::new(persistence_failures_total.clone()))?;

        let monitored_endpoints = Gauge::with_opts(
            Opts::new("monitored_endpoints", "Endpoints currently registered").namespace("monitor"),
        )?;
        registry.register(Box::new(monitored_endpoints.clone()))?;

        Ok(Arc::new(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            checks_total,
            check_duration_seconds,
            insights_total,
            insight_failures_total,
            stream_dropped_total,
            persistence_failures_total,
            monitored_endpoints,
        }))
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
