//! telemetry/counters.rs
//! Per-session performance counters.
//!
//! Summary: byte counts reported by the engine plus time spent per stage.
//! Reset to zero whenever a stream (re)starts its session; `perf()` on a
//! stream hands out a copy.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::telemetry::timers::{Stage, StageClock};

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfCounters {
    /// Time spent reading from the upstream source.
    pub read_time_ns: u64,
    /// Time spent writing to the downstream sink.
    pub write_time_ns: u64,
    /// Bytes the engine consumed.
    pub bytes_in: u64,
    /// Bytes the engine produced.
    pub bytes_out: u64,
    pub engine_time_ns: u64,
    /// Time spent copying into staging buffers and reallocating them.
    pub copy_time_ns: u64,
}

impl PerfCounters {
    /// Record one successful engine call.
    pub fn add_engine(&mut self, consumed: usize, produced: usize) {
        self.bytes_in += consumed as u64;
        self.bytes_out += produced as u64;
    }

    pub fn add_time(&mut self, stage: Stage, ns: u64) {
        let slot = match stage {
            Stage::Read => &mut self.read_time_ns,
            Stage::Write => &mut self.write_time_ns,
            Stage::Engine => &mut self.engine_time_ns,
            Stage::Copy => &mut self.copy_time_ns,
        };
        *slot = slot.saturating_add(ns);
    }

    /// Stop `clock` and charge its time to its stage.
    pub fn record(&mut self, clock: StageClock) {
        self.add_time(clock.stage(), clock.elapsed_ns());
    }

    pub fn time(&self, stage: Stage) -> u64 {
        match stage {
            Stage::Read => self.read_time_ns,
            Stage::Write => self.write_time_ns,
            Stage::Engine => self.engine_time_ns,
            Stage::Copy => self.copy_time_ns,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    // Combine counters from independent streams.
    pub fn merge(&mut self, other: &PerfCounters) {
        *self += *other;
    }
}

impl AddAssign for PerfCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.read_time_ns   += rhs.read_time_ns;
        self.write_time_ns  += rhs.write_time_ns;
        self.bytes_in       += rhs.bytes_in;
        self.bytes_out      += rhs.bytes_out;
        self.engine_time_ns += rhs.engine_time_ns;
        self.copy_time_ns   += rhs.copy_time_ns;
    }
}
