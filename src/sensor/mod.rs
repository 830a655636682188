//! Shared sensor readings.
//!
//! The sampling side writes through [`SensorState::set_temperature`] and
//! [`SensorState::set_water`]; the `/data` route reads a [`SensorSnapshot`].
//! Both readings live in one `AtomicU64` (temperature in the high half,
//! water in the low half, each as raw `f32` bits), so a snapshot is a single
//! load and can never mix halves of two different updates. This holds no
//! matter which thread or interrupt context the writer runs on.

pub mod simulator;

use std::sync::atomic::{AtomicU64, Ordering};

pub use simulator::Simulator;

/// One coherent reading of both sensors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    pub temperature: f32,
    pub water: f32,
}

#[derive(Debug)]
pub struct SensorState {
    packed: AtomicU64,
}

impl SensorState {
    pub const fn new() -> Self {
        Self {
            packed: AtomicU64::new(pack(0.0, 0.0)),
        }
    }

    /// Stores `value` unmodified, NaN and infinities included.
    pub fn set_temperature(&self, value: f32) {
        self.update(|_, water| pack(value, water));
    }

    pub fn set_water(&self, value: f32) {
        self.update(|temperature, _| pack(temperature, value));
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        let (temperature, water) = unpack(self.packed.load(Ordering::Acquire));
        SensorSnapshot { temperature, water }
    }

    fn update(&self, f: impl Fn(f32, f32) -> u64) {
        // fetch_update only fails when the closure returns None
        let _ = self
            .packed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                let (temperature, water) = unpack(current);
                Some(f(temperature, water))
            });
    }
}

impl Default for SensorState {
    fn default() -> Self {
        Self::new()
    }
}

const fn pack(temperature: f32, water: f32) -> u64 {
    ((temperature.to_bits() as u64) << 32) | water.to_bits() as u64
}

fn unpack(packed: u64) -> (f32, f32) {
    (
        f32::from_bits((packed >> 32) as u32),
        f32::from_bits(packed as u32),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_keeps_exact_bit_patterns() {
        for (t, w) in [(22.0, 50.0), (-0.0, f32::MAX), (f32::INFINITY, f32::MIN_POSITIVE)] {
            let (t2, w2) = unpack(pack(t, w));
            assert_eq!(t.to_bits(), t2.to_bits());
            assert_eq!(w.to_bits(), w2.to_bits());
        }
    }

    #[test]
    fn nan_payload_survives() {
        let nan = f32::from_bits(0x7fc0_1234);
        let (t, _) = unpack(pack(nan, 1.0));
        assert_eq!(t.to_bits(), 0x7fc0_1234);
    }
}
