//! telemetry/timers.rs
//! Stage clock for the stream counters.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Read,
    Write,
    Engine,
    Copy,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Read   => "read",
            Stage::Write  => "write",
            Stage::Engine => "engine",
            Stage::Copy   => "copy",
        };
        f.write_str(name)
    }
}

/// Started at the beginning of a stage; `elapsed_ns` reads it off.
#[derive(Debug, Clone, Copy)]
pub struct StageClock {
    stage: Stage,
    start: Instant,
}

impl StageClock {
    pub fn start(stage: Stage) -> Self {
        Self { stage, start: Instant::now() }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn elapsed_ns(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}
