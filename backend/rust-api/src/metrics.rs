use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .unwrap();

    // Storage Metrics
    pub static ref STORAGE_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "progress_storage_operations_total",
        "Progress storage operations by outcome",
        &["operation", "status"]
    )
    .unwrap();

    // Game Metrics
    pub static ref PROBLEMS_GENERATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "problems_generated_total",
        "Total number of generated problems",
        &["operation", "difficulty"]
    )
    .unwrap();

    pub static ref ANSWERS_SUBMITTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "answers_submitted_total",
        "Total number of answers submitted",
        &["correct"]
    )
    .unwrap();

    pub static ref STARS_AWARDED_TOTAL: IntCounter = register_int_counter!(
        "stars_awarded_total",
        "Total number of stars awarded"
    )
    .unwrap();

    pub static ref LEVELS_COMPLETED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "levels_completed_total",
        "First-time level completions",
        &["level"]
    )
    .unwrap();

    pub static ref DIFFICULTY_DECISIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "difficulty_decisions_total",
        "Difficulty decisions by message source and direction",
        &["source", "direction"]
    )
    .unwrap();

    pub static ref SESSIONS_ACTIVE: IntGauge = register_int_gauge!(
        "sessions_active",
        "Number of currently active play sessions"
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

pub fn record_storage_operation(operation: &str, status: &str) {
    STORAGE_OPERATIONS_TOTAL
        .with_label_values(&[operation, status])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_game_metrics() {
        PROBLEMS_GENERATED_TOTAL
            .with_label_values(&["addition", "easy"])
            .inc();
        record_storage_operation("load", "ok");

        let output = render_metrics().unwrap();
        assert!(output.contains("problems_generated_total"));
        assert!(output.contains("progress_storage_operations_total"));
    }
}
