//! qzio-core
//!
//! Streaming compression adapter: `io::Write`/`io::Read` wrappers that drive a
//! chunk-oriented compression engine, with option handling, buffer growth and
//! per-stream performance counters.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

// Parameters and engines
pub mod compression;
pub mod engine;
pub mod params;
pub mod telemetry;

// Stream layer
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::engine::{Engine, SoftwareEngine, Step};
    pub use crate::params::{
        Algorithm, DebugLevel, DeflateFormat, Direction, EnvOverrides, InputBufferMode, ParameterSet,
        QzOption,
    };
    pub use crate::stream::{Reader, Writer};
    pub use crate::telemetry::{PerfCounters, PerfSnapshot};
    pub use crate::types::{ParamError, QzError};
}
