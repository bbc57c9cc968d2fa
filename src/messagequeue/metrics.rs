//! Prometheus metrics for update publication

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec,
};

/// Message queue metrics
pub struct MessageQueueMetrics {
    /// Updates acknowledged by the bus
    pub messages_published: CounterVec,

    /// Updates that failed to publish
    pub publish_failures: CounterVec,

    /// Time from submit to acknowledgement
    pub publish_latency: HistogramVec,

    /// Encoded envelope size
    pub message_size: HistogramVec,
}

lazy_static! {
    pub static ref MESSAGE_QUEUE_METRICS: MessageQueueMetrics = MessageQueueMetrics {
        messages_published: register_counter_vec!(
            "xp_mq_messages_published_total",
            "Total number of updates published",
            &["entity", "update_type", "backend"]
        )
        .unwrap(),

        publish_failures: register_counter_vec!(
            "xp_mq_publish_failures_total",
            "Total number of update publish failures",
            &["entity", "update_type", "backend", "error"]
        )
        .unwrap(),

        publish_latency: register_histogram_vec!(
            "xp_mq_publish_latency_seconds",
            "Update publish latency in seconds",
            &["entity", "backend"]
        )
        .unwrap(),

        message_size: register_histogram_vec!(
            "xp_mq_message_size_bytes",
            "Encoded update envelope size in bytes",
            &["entity"],
            prometheus::exponential_buckets(64.0, 4.0, 8).unwrap()
        )
        .unwrap(),
    };
}

/// Initialize message queue metrics
pub fn init_message_queue_metrics() {
    lazy_static::initialize(&MESSAGE_QUEUE_METRICS);
}
