use std::sync::Arc;

use crate::error::{DispatchError, SinkFailure};

use super::{LogRecord, LogSink};

/// Broadcasts every record to an ordered, fixed set of sinks.
///
/// A handler is never mutated once built; reconfiguring produces a new one. This lets the
/// rotation swap the installed handler while dispatches against the old one are still running.
#[derive(Clone, Default)]
pub struct FanoutHandler {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl FanoutHandler {
    pub fn new(sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self { sinks }
    }

    /// A handler with no sinks. It accepts no level and drops every record.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn enabled(&self, level: log::Level) -> bool {
        self.sinks.iter().any(|sink| sink.enabled(level))
    }

    /// Writes `record` to every sink in order. A failing sink doesn't stop the ones after it.
    pub fn dispatch(&self, record: &LogRecord) -> Result<(), DispatchError> {
        let failures: Vec<SinkFailure> = self
            .sinks
            .iter()
            .enumerate()
            .filter_map(|(index, sink)| {
                sink.write_log(record)
                    .err()
                    .map(|error| SinkFailure { index, error })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError {
                failures,
                total: self.sinks.len(),
            })
        }
    }

    pub fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }

    pub fn with_attrs(&self, attrs: &[(String, String)]) -> Self {
        Self {
            sinks: self.sinks.iter().map(|sink| sink.with_attrs(attrs)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
    };

    use super::*;
    use crate::error::WriteError;

    #[derive(Default)]
    struct RecordingSink {
        name: String,
        fail: bool,
        calls: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<String>>>,
        context: Vec<(String, String)>,
    }

    impl RecordingSink {
        fn new(name: &str, fail: bool) -> Self {
            Self {
                name: name.to_string(),
                fail,
                ..Default::default()
            }
        }
    }

    impl LogSink for RecordingSink {
        fn name(&self) -> &str {
            &self.name
        }

        fn write_log(&self, record: &LogRecord) -> Result<(), WriteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut line = record.message.clone();
            for (k, v) in self.context.iter().chain(record.attributes.iter()) {
                line.push_str(&format!(" {}={}", k, v));
            }
            self.seen.lock().unwrap().push(line);

            if self.fail {
                Err(WriteError::new(
                    &self.name,
                    io::Error::new(io::ErrorKind::BrokenPipe, "closed"),
                ))
            } else {
                Ok(())
            }
        }

        fn flush(&self) {}

        fn with_attrs(&self, attrs: &[(String, String)]) -> Arc<dyn LogSink> {
            let mut context = self.context.clone();
            context.extend_from_slice(attrs);
            Arc::new(Self {
                name: self.name.clone(),
                fail: self.fail,
                calls: Arc::clone(&self.calls),
                seen: Arc::clone(&self.seen),
                context,
            })
        }
    }

    fn record() -> LogRecord {
        LogRecord::new(log::Level::Info, "hello")
    }

    #[test]
    fn test_all_succeed() {
        let a = RecordingSink::new("a", false);
        let b = RecordingSink::new("b", false);
        let (calls_a, calls_b) = (Arc::clone(&a.calls), Arc::clone(&b.calls));
        let fanout = FanoutHandler::new(vec![Arc::new(a), Arc::new(b)]);

        assert!(fanout.dispatch(&record()).is_ok());
        assert_eq!(calls_a.load(Ordering::SeqCst), 1);
        assert_eq!(calls_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_single_failure_does_not_short_circuit() {
        for failing in 0..4 {
            let sinks: Vec<RecordingSink> = (0..4)
                .map(|i| RecordingSink::new(&format!("sink-{}", i), i == failing))
                .collect();
            let calls: Vec<Arc<AtomicUsize>> =
                sinks.iter().map(|s| Arc::clone(&s.calls)).collect();
            let fanout = FanoutHandler::new(
                sinks
                    .into_iter()
                    .map(|s| Arc::new(s) as Arc<dyn LogSink>)
                    .collect(),
            );

            let err = fanout.dispatch(&record()).unwrap_err();

            assert_eq!(err.failed_indices(), vec![failing]);
            assert_eq!(err.total, 4);
            assert_eq!(err.failures[0].error.sink, format!("sink-{}", failing));
            for c in &calls {
                assert_eq!(c.load(Ordering::SeqCst), 1);
            }
        }
    }

    #[test]
    fn test_multiple_failures_are_aggregated() {
        let fanout = FanoutHandler::new(vec![
            Arc::new(RecordingSink::new("a", true)),
            Arc::new(RecordingSink::new("b", false)),
            Arc::new(RecordingSink::new("c", true)),
        ]);

        let err = fanout.dispatch(&record()).unwrap_err();

        assert_eq!(err.failed_indices(), vec![0, 2]);
        let message = err.to_string();
        assert!(message.starts_with("2 of 3 sinks failed"));
        assert!(message.contains("[2] c: closed"));
    }

    #[test]
    fn test_empty_handler() {
        let fanout = FanoutHandler::empty();

        assert!(!fanout.enabled(log::Level::Error));
        assert!(fanout.dispatch(&record()).is_ok());
    }

    #[test]
    fn test_enabled_for_every_level() {
        let fanout = FanoutHandler::new(vec![Arc::new(RecordingSink::new("a", false))]);

        for level in [
            log::Level::Error,
            log::Level::Warn,
            log::Level::Info,
            log::Level::Debug,
            log::Level::Trace,
        ] {
            assert!(fanout.enabled(level));
        }
    }

    #[test]
    fn test_with_attrs_builds_new_handler() {
        let sink = RecordingSink::new("a", false);
        let seen = Arc::clone(&sink.seen);
        let base = FanoutHandler::new(vec![Arc::new(sink)]);
        let scoped = base.with_attrs(&[("user".to_string(), "ada".to_string())]);

        base.dispatch(&record()).unwrap();
        scoped.dispatch(&record().with_attr("id", "7")).unwrap();

        assert_eq!(scoped.len(), 1);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["hello".to_string(), "hello user=ada id=7".to_string()]
        );
    }
}
