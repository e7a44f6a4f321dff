mod common;

#[cfg(test)]
mod params_tests {
    use std::collections::HashMap;

    use qzio_core::params::{
        Algorithm, DebugLevel, EnvOverrides, ParamError, ParameterSet, QzOption, SessionParams,
    };
    use qzio_core::stream::Writer;
    use qzio_core::types::QzError;

    use super::common::FakeEngine;

    fn overrides(pairs: &[(&str, &str)]) -> EnvOverrides {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        EnvOverrides::from_lookup(|key| map.get(key).cloned()).unwrap()
    }

    #[test]
    fn override_fills_unset_level() {
        let ov = overrides(&[("QZIO_COMPRESSION_LEVEL", "9"), ("QZIO_DEBUG_LEVEL", "med")]);
        let mut w = Writer::with_engine(Vec::new(), FakeEngine::new(64)).with_overrides(ov);
        assert_eq!(w.params().level, 1);

        w.write_chunk(b"start").unwrap();
        assert_eq!(w.params().level, 9);
        assert_eq!(w.params().debug_level, DebugLevel::Med);
    }

    #[test]
    fn explicit_option_beats_override() {
        let ov = overrides(&[("QZIO_COMPRESSION_LEVEL", "9"), ("QZIO_ALGORITHM", "zstd")]);
        let mut w = Writer::with_engine(Vec::new(), FakeEngine::new(64)).with_overrides(ov);
        w.apply(&[QzOption::CompressionLevel(3)]).unwrap();

        w.write_chunk(b"start").unwrap();
        assert_eq!(w.params().level, 3);
        assert_eq!(w.params().algorithm, Algorithm::Zstd);
    }

    #[test]
    fn out_of_range_override_fails_session_start() {
        let ov = EnvOverrides { level: Some(12), ..EnvOverrides::none() };
        let mut w = Writer::new(Vec::new()).with_overrides(ov);
        let err = QzError::InvalidParameter(ParamError::CompressionLevel);
        assert_eq!(w.write_chunk(b"data"), Err(err.clone()));
        assert_eq!(w.write_chunk(b"data"), Err(err));
        assert!(w.get_ref().is_empty());
    }

    #[test]
    fn bad_override_values_are_named() {
        let map = HashMap::from([("QZIO_ALGORITHM".to_string(), "brotli".to_string())]);
        assert_eq!(
            EnvOverrides::from_lookup(|k| map.get(k).cloned()),
            Err(QzError::InvalidParameter(ParamError::Algorithm))
        );
        let map = HashMap::from([("QZIO_COMPRESSION_LEVEL".to_string(), "-4".to_string())]);
        assert_eq!(
            EnvOverrides::from_lookup(|k| map.get(k).cloned()),
            Err(QzError::InvalidParameter(ParamError::CompressionLevel))
        );
    }

    #[test]
    fn option_domain_errors_stop_the_batch() {
        let mut s = SessionParams::new();
        let err = s
            .apply(&[
                QzOption::CompressionLevel(5),
                QzOption::OutputBufLength(1024),
                QzOption::CompressionLevel(7),
            ])
            .unwrap_err();
        assert_eq!(err, QzError::InvalidParameter(ParamError::OutputBufLength));
        assert_eq!(s.params().level, 5);
    }

    #[test]
    fn session_params_reject_stream_only_options() {
        let mut s = SessionParams::new();
        assert_eq!(
            s.apply(&[QzOption::BounceBufferLength(4096)]),
            Err(QzError::InvalidParameter(ParamError::InvalidTarget))
        );
        s.apply(&[QzOption::SwBackup(true), QzOption::MaxForks(4)]).unwrap();
        s.freeze();
        assert_eq!(s.apply(&[QzOption::MaxForks(2)]), Err(QzError::ApplyAfterStart));
        assert_eq!(s.params().max_forks, 4);
    }

    #[test]
    fn parameter_set_serializes_without_bookkeeping() {
        let json = serde_json::to_value(ParameterSet::default()).unwrap();
        assert_eq!(json["level"], 1);
        assert!(json.get("explicit").is_none());
    }
}
