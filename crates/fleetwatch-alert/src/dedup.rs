use std::collections::HashMap;

use fleetwatch_common::types::{AlertKey, RawSample, SampleState};

/// Drops pending samples. Returns the firing ones and how many were dropped.
pub fn drop_pending(samples: Vec<RawSample>) -> (Vec<RawSample>, usize) {
    let before = samples.len();
    let firing: Vec<RawSample> = samples
        .into_iter()
        .filter(|s| s.state == SampleState::Firing)
        .collect();
    let pending = before - firing.len();
    (firing, pending)
}

/// Collapses samples sharing an [`AlertKey`], keeping the one with the
/// highest severity. On a tie the first sample seen wins. Output follows the
/// order in which keys were first seen.
///
/// Samples without a key are dropped; run [`crate::validate::validate`]
/// first so there are none.
pub fn deduplicate(samples: Vec<RawSample>) -> Vec<RawSample> {
    let mut slots: HashMap<AlertKey, usize> = HashMap::new();
    let mut out: Vec<RawSample> = Vec::with_capacity(samples.len());

    for sample in samples {
        let Some(key) = sample.key() else {
            continue;
        };
        match slots.get(&key) {
            Some(&idx) => {
                if sample.severity().priority() > out[idx].severity().priority() {
                    out[idx] = sample;
                }
            }
            None => {
                slots.insert(key, out.len());
                out.push(sample);
            }
        }
    }
    out
}
