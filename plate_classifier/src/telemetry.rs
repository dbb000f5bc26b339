use anyhow::Context;
use opentelemetry::{
    global,
    metrics::{Counter, Histogram, MeterProvider},
    KeyValue,
};
use prometheus::Registry;

/// Upper bounds in milliseconds; a 128×128 forward pass on CPU lands in the
/// low tens.
const DURATION_BOUNDARIES_MS: [f64; 12] = [
    5.0, 10.0, 15.0, 20.0, 30.0, 50.0, 75.0, 100.0, 250.0, 500.0, 1000.0, 2500.0,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Success,
    InvalidInput,
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::InvalidInput => "invalid_input",
            Outcome::Failure => "failure",
        }
    }
}

pub struct Metrics {
    predictions: Counter<u64>,
    prediction_duration: Histogram<u64>,
    pub registry: Registry,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();
        let exporter = opentelemetry_prometheus::exporter()
            .with_registry(registry.clone())
            .build()
            .context("failed to build prometheus exporter")?;

        let provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
            .with_reader(exporter)
            .build();

        let meter = provider.meter("plate_classifier");
        global::set_meter_provider(provider);

        let predictions = meter
            .u64_counter("predictions_total")
            .with_description("Number of prediction requests by outcome")
            .build();

        let prediction_duration = meter
            .u64_histogram("prediction_duration_ms")
            .with_boundaries(DURATION_BOUNDARIES_MS.to_vec())
            .with_description("Time spent decoding, preprocessing and classifying an upload")
            .build();

        Ok(Metrics {
            predictions,
            prediction_duration,
            registry,
        })
    }

    pub fn record_prediction(&self, outcome: Outcome, duration_ms: u64) {
        let attributes = [KeyValue::new("outcome", outcome.as_str())];
        self.predictions.add(1, &attributes);
        self.prediction_duration.record(duration_ms, &attributes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_increasing() {
        assert!(DURATION_BOUNDARIES_MS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_recorded_predictions_are_exported() {
        let metrics = Metrics::new().unwrap();

        metrics.record_prediction(Outcome::Success, 12);
        metrics.record_prediction(Outcome::InvalidInput, 1);

        let names: Vec<String> = metrics
            .registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.iter().any(|name| name.starts_with("predictions_total")));
        assert!(names
            .iter()
            .any(|name| name.starts_with("prediction_duration_ms")));
    }
}
