//! Metric definitions for the tracking pipeline.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

pub const EVENTS_RECEIVED: MetricDef = MetricDef {
    name: "events.received",
    metric_type: MetricType::Counter,
    description: "Events delivered to the pipeline. Tagged with kind.",
};

pub const EVENTS_FAILED: MetricDef = MetricDef {
    name: "events.failed",
    metric_type: MetricType::Counter,
    description: "Events that ended in a caught error at the handler boundary. Tagged with kind.",
};

pub const DISPATCH_FAILURES: MetricDef = MetricDef {
    name: "dispatch.failures",
    metric_type: MetricType::Counter,
    description: "Detached click dispatches that failed in the background",
};

pub const ALL_METRICS: &[MetricDef] = &[EVENTS_RECEIVED, EVENTS_FAILED, DISPATCH_FAILURES];
