use fleetwatch_common::types::RawSample;

/// Keeps samples carrying all four correlation labels.
///
/// Returns the survivors and the number discarded.
pub fn validate(samples: Vec<RawSample>) -> (Vec<RawSample>, usize) {
    let before = samples.len();
    let valid: Vec<RawSample> = samples.into_iter().filter(is_valid).collect();
    let invalid = before - valid.len();
    if invalid > 0 {
        tracing::warn!(
            invalid,
            "Found alerts without customer, configuration, definition or source id"
        );
    }
    (valid, invalid)
}

fn is_valid(sample: &RawSample) -> bool {
    sample.customer_id().is_some()
        && sample.definition_id().is_some()
        && sample.configuration_id().is_some()
        && sample.source_id().is_some()
}
