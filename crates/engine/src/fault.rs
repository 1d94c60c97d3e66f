// SPDX-License-Identifier: MIT

//! Failure injection
//!
//! `meta.fail_simulate` in the project config gives a probability of
//! forcing a simulated execution failure before the runner is invoked,
//! exercising the failure path end to end. An injected failure is
//! handled exactly like a genuine runner error.

/// Roll against the configured failure probability
pub fn should_inject(probability: Option<f64>) -> bool {
    let Some(p) = probability else {
        return false;
    };
    if p <= 0.0 {
        return false;
    }
    if p >= 1.0 {
        return true;
    }
    random_unit() < p
}

/// Uniform float in `[0, 1)` from UUID v4 random bytes.
///
/// Bytes 6 and 7 carry version bits, so only the first six bytes are
/// used (48 random bits).
fn random_unit() -> f64 {
    let bytes = *uuid::Uuid::new_v4().as_bytes();
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    let n = u64::from_be_bytes(raw) >> 16;
    n as f64 / (1u64 << 48) as f64
}

#[cfg(test)]
#[path = "fault_tests.rs"]
mod tests;
