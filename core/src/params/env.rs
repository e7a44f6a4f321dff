//! params/env.rs
//! Configuration overrides, read once at the application edge and passed to
//! stream constructors as a plain value.

use crate::constants::env_vars;
use crate::params::types::{Algorithm, DebugLevel};
use crate::types::{ParamError, QzError};

/// Overrides merged into a stream's parameters at session start.
///
/// They never replace a field the caller set through an option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub algorithm: Option<Algorithm>,
    pub level: Option<u32>,
    pub debug_level: Option<DebugLevel>,
}

impl EnvOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    /// Read `QZIO_ALGORITHM`, `QZIO_COMPRESSION_LEVEL` and `QZIO_DEBUG_LEVEL`
    /// from the process environment.
    pub fn from_env() -> Result<Self, QzError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, against any key lookup. Unset or blank keys leave
    /// the field empty; unparsable values are `InvalidParameter`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, QzError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let algorithm = get(env_vars::ALGORITHM).map(|v| v.parse::<Algorithm>()).transpose()?;

        let level = get(env_vars::COMPRESSION_LEVEL)
            .map(|v| match v.trim().parse::<i64>() {
                Ok(n) if n > 0 && n <= u32::MAX as i64 => Ok(n as u32),
                _ => Err(ParamError::CompressionLevel),
            })
            .transpose()?;

        let debug_level = get(env_vars::DEBUG_LEVEL).map(|v| v.parse::<DebugLevel>()).transpose()?;

        Ok(Self { algorithm, level, debug_level })
    }

    pub fn is_empty(&self) -> bool {
        self.algorithm.is_none() && self.level.is_none() && self.debug_level.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parses_all_three_keys() {
        let env = EnvOverrides::from_lookup(lookup(&[
            ("QZIO_ALGORITHM", "zstd"),
            ("QZIO_COMPRESSION_LEVEL", "7"),
            ("QZIO_DEBUG_LEVEL", "low"),
        ]))
        .unwrap();
        assert_eq!(env.algorithm, Some(Algorithm::Zstd));
        assert_eq!(env.level, Some(7));
        assert_eq!(env.debug_level, Some(DebugLevel::Low));
    }

    #[test]
    fn blank_values_are_unset() {
        let env = EnvOverrides::from_lookup(lookup(&[("QZIO_ALGORITHM", "  ")])).unwrap();
        assert!(env.is_empty());
    }

    #[test]
    fn bad_values_are_named_errors() {
        let err = EnvOverrides::from_lookup(lookup(&[("QZIO_COMPRESSION_LEVEL", "0")])).unwrap_err();
        assert_eq!(err, QzError::InvalidParameter(ParamError::CompressionLevel));

        let err = EnvOverrides::from_lookup(lookup(&[("QZIO_ALGORITHM", "snappy")])).unwrap_err();
        assert_eq!(err, QzError::InvalidParameter(ParamError::Algorithm));
    }
}
