mod common;

#[cfg(test)]
mod reader_tests {
    use std::io::{self, Cursor, Read};

    use qzio_core::params::{Direction, ParamError, QzOption};
    use qzio_core::stream::{Reader, Writer};
    use qzio_core::types::QzError;

    use super::common::{sample_payload, FakeEngine};

    const KIB: usize = 1024;

    fn small_buffers() -> Vec<QzOption> {
        vec![
            QzOption::InputBufLength(128 * KIB),
            QzOption::OutputBufLength(128 * KIB),
            QzOption::BufferGrowth(128 * KIB),
        ]
    }

    /// Upstream that is interrupted once before every successful read.
    struct Stuttering {
        inner: Cursor<Vec<u8>>,
        interrupt_next: bool,
    }

    impl Read for Stuttering {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt_next = !self.interrupt_next;
            if self.interrupt_next {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn input_and_output_grow_without_resubmission() {
        let data = sample_payload(300 * KIB);
        let engine = FakeEngine::new(64 * KIB).needing_output(600 * KIB);
        let mut r = Reader::with_engine(Cursor::new(data.clone()), engine);
        r.apply(&small_buffers()).unwrap();

        let mut out = vec![0u8; data.len()];
        assert_eq!(r.read_chunk(&mut out).unwrap(), data.len());
        assert_eq!(out, data);

        let e = r.engine();
        assert_eq!(e.insufficient, 2);
        assert_eq!(e.consumed_total, data.len());
        assert_eq!(e.output_lens[2], 300 * KIB + 512 * KIB);

        let mut tail = [0u8; 16];
        assert_eq!(r.read_chunk(&mut tail).unwrap(), 0);
        assert_eq!(r.perf().bytes_in, data.len() as u64);
    }

    #[test]
    fn input_limit_is_terminal() {
        let data = sample_payload(300 * KIB);
        let mut r = Reader::with_engine(Cursor::new(data), FakeEngine::new(64 * KIB));
        let mut opts = small_buffers();
        opts.push(QzOption::MaxBufferLength(200 * KIB));
        r.apply(&opts).unwrap();

        let mut out = vec![0u8; 4096];
        let err = r.read_chunk(&mut out).unwrap_err();
        assert!(matches!(err, QzError::BufferLimitExceeded { limit, .. } if limit == 200 * KIB));
        assert_eq!(r.read_chunk(&mut out), Err(err));
        assert_eq!(r.engine().calls, 0);
    }

    #[test]
    fn delivered_bytes_come_back_before_the_error() {
        let data = sample_payload(100);
        let engine = FakeEngine::new(10).failing_on(3, QzError::CorruptInput("bad member".into()));
        let mut r = Reader::with_engine(Cursor::new(data.clone()), engine);

        let mut out = [0u8; 100];
        assert_eq!(r.read_chunk(&mut out).unwrap(), 20);
        assert_eq!(&out[..20], &data[..20]);

        let bad = QzError::CorruptInput("bad member".into());
        let before = out;
        assert_eq!(r.read_chunk(&mut out), Err(bad.clone()));
        assert_eq!(out, before);
        assert_eq!(r.read_chunk(&mut out), Err(bad.clone()));
        assert_eq!(out, before);
        assert_eq!(r.engine().calls, 3);

        assert_eq!(r.close(), Err(bad.clone()));
        assert_eq!(r.close(), Err(bad));
        assert_eq!(r.engine().closes, 1);
    }

    #[test]
    fn never_started_close_skips_engine() {
        let mut r = Reader::with_engine(io::empty(), FakeEngine::new(16));
        assert_eq!(r.close(), Ok(()));
        assert_eq!(r.engine().starts, 0);
        assert_eq!(r.engine().closes, 0);
    }

    #[test]
    fn active_close_reaches_engine_once() {
        let mut r = Reader::with_engine(Cursor::new(b"plain bytes".to_vec()), FakeEngine::new(4));
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"plain bytes");

        assert_eq!(r.close(), Ok(()));
        assert_eq!(r.close(), Ok(()));
        assert_eq!(r.engine().closes, 1);
    }

    #[test]
    fn interrupted_upstream_reads_are_retried() {
        let src = Stuttering { inner: Cursor::new(b"resilient".to_vec()), interrupt_next: false };
        let mut r = Reader::with_engine(src, FakeEngine::new(64));
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"resilient");
    }

    #[test]
    fn truncated_container_is_corrupt_input() {
        let data = sample_payload(4000);
        let mut w = Writer::new(Vec::new());
        w.write_chunk(&data).unwrap();
        let mut packed = w.finish().unwrap();
        packed.truncate(packed.len() - 10);

        let mut r = Reader::new(Cursor::new(packed));
        let mut out = Vec::new();
        let err = r.read_to_end(&mut out).unwrap_err();
        assert!(matches!(QzError::from_io(&err), QzError::CorruptInput(_)));
    }

    #[test]
    fn reset_swaps_source_and_zeroes_perf() {
        let mut r = Reader::with_engine(Cursor::new(b"first".to_vec()), FakeEngine::new(64));
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        assert!(!r.perf().is_zero());

        let previous = r.reset(Cursor::new(b"second".to_vec())).unwrap();
        assert_eq!(previous.into_inner(), b"first");
        assert!(r.perf().is_zero());
        assert_eq!(r.crc32(), 0);

        out.clear();
        r.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"second");
        assert_eq!(r.engine().starts, 2);
    }

    #[test]
    fn reader_rejects_writer_options() {
        let mut r = Reader::new(io::empty());
        assert_eq!(
            r.apply(&[QzOption::CompressionLevel(6)]),
            Err(QzError::InvalidParameter(ParamError::InvalidTarget))
        );
        assert_eq!(
            r.apply(&[QzOption::Direction(Direction::Compress)]),
            Err(QzError::InvalidParameter(ParamError::IncompatibleDirection))
        );
        r.apply(&[QzOption::Direction(Direction::Decompress)]).unwrap();
        assert_eq!(r.params().direction, Direction::Decompress);
    }
}
