//! src/telemetry/snapshot.rs
//!
//! Derived view over one stream's counters.
//!
//! Design notes:
//! - Ratio is uncompressed over compressed bytes in both directions, so a
//!   writer and the reader of its output report the same figure.
//! - Engine speed is uncompressed megabytes (10^6) per second of engine time.
//! - Zero denominators yield 0.0 rather than NaN or infinity.

use std::fmt;

use serde::Serialize;

use crate::params::{Algorithm, Direction};
use crate::telemetry::counters::PerfCounters;

const NS_PER_MS: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerfSnapshot {
    pub direction: Direction,
    pub algorithm: Algorithm,
    pub level: u32,
    pub counters: PerfCounters,
    pub compression_ratio: f64,
    pub engine_mb_per_sec: f64,
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl PerfSnapshot {
    /// `direction` is `Compress` for writer counters and `Decompress` for
    /// reader counters.
    pub fn new(direction: Direction, algorithm: Algorithm, level: u32, counters: PerfCounters) -> Self {
        let (plain, packed) = match direction {
            Direction::Decompress => (counters.bytes_out, counters.bytes_in),
            _ => (counters.bytes_in, counters.bytes_out),
        };
        let engine_secs = counters.engine_time_ns as f64 / 1e9;
        let engine_mb_per_sec = if engine_secs > 0.0 { (plain as f64 / 1e6) / engine_secs } else { 0.0 };

        Self {
            direction,
            algorithm,
            level,
            counters,
            compression_ratio: ratio(plain, packed),
            engine_mb_per_sec,
        }
    }

    pub fn op_code(&self) -> &'static str {
        match self.direction {
            Direction::Decompress => "d",
            _ => "c",
        }
    }

    pub fn csv_header() -> &'static str {
        "op,algo,level,in,out,rtime,wtime,etime,ctime,ratio,speed"
    }

    pub fn to_csv_row(&self) -> String {
        let c = &self.counters;
        format!(
            "{},{},{},{},{},{},{},{},{},{:.6},{:.6}",
            self.op_code(),
            self.algorithm,
            self.level,
            c.bytes_in,
            c.bytes_out,
            c.read_time_ns / NS_PER_MS,
            c.write_time_ns / NS_PER_MS,
            c.engine_time_ns / NS_PER_MS,
            c.copy_time_ns / NS_PER_MS,
            self.compression_ratio,
            self.engine_mb_per_sec,
        )
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for PerfSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counters;
        writeln!(f, "Algorithm {}", self.algorithm)?;
        writeln!(f, "Level {}", self.level)?;
        writeln!(f, "Bytes In {}", c.bytes_in)?;
        writeln!(f, "Bytes Out {}", c.bytes_out)?;
        writeln!(f, "Read Time {} ms", c.read_time_ns / NS_PER_MS)?;
        writeln!(f, "Write Time {} ms", c.write_time_ns / NS_PER_MS)?;
        writeln!(f, "Engine Time {} ms", c.engine_time_ns / NS_PER_MS)?;
        writeln!(f, "Copy Time {} ms", c.copy_time_ns / NS_PER_MS)?;
        writeln!(f, "Compression Ratio {:.6}", self.compression_ratio)?;
        write!(f, "Compression Speed {:.6} MB/s (Engine)", self.engine_mb_per_sec)
    }
}
