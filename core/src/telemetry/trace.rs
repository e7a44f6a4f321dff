//! telemetry/trace.rs
//! Debug-level gated trace events.

/// Emit a `tracing` event when the session's debug level reaches `$level`.
///
/// `High` and above also raise the event to `info`, so it shows with a plain
/// subscriber; below that it is a `debug` event.
///
/// ```ignore
/// qz_trace!(self.debug_level, DebugLevel::Med, consumed = step.consumed, "engine step");
/// ```
#[macro_export]
macro_rules! qz_trace {
    ($current:expr, $level:expr, $($arg:tt)+) => {{
        let current: $crate::params::DebugLevel = $current;
        if current >= $level {
            if current >= $crate::params::DebugLevel::High {
                ::tracing::info!($($arg)+);
            } else {
                ::tracing::debug!($($arg)+);
            }
        }
    }};
}
