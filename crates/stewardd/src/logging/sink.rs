//! Sink table and the writers that route formatted records into it.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{Level, Metadata};
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

use super::syslog::SyslogTransport;

/// Output destinations managed by [`super::LogSinks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// Standard output; development mode only.
    Console,
    /// Daily rotating log file; production mode only.
    File,
    /// Remote syslog over UDP; production mode only.
    Syslog,
}

pub(crate) enum Destination {
    Console,
    File(RollingFileAppender),
    Syslog(SyslogTransport),
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => f.write_str("Console"),
            Self::File(_) => f.write_str("File"),
            Self::Syslog(transport) => f.debug_tuple("Syslog").field(transport).finish(),
        }
    }
}

impl Destination {
    fn write(&self, level: Level, buf: &[u8]) {
        match self {
            Self::Console => {
                let _ = io::stdout().lock().write_all(buf);
            }
            Self::File(appender) => {
                let _ = appender.make_writer().write_all(buf);
            }
            Self::Syslog(transport) => transport.send(level, buf),
        }
    }
}

/// An attached destination and the threshold records must meet.
#[derive(Debug)]
pub(crate) struct Sink {
    pub(crate) threshold: LevelFilter,
    pub(crate) destination: Arc<Destination>,
}

impl Sink {
    pub(crate) fn new(threshold: LevelFilter, destination: Destination) -> Self {
        Self {
            threshold,
            destination: Arc::new(destination),
        }
    }

    fn accepts(&self, level: &Level) -> bool {
        *level <= self.threshold
    }
}

type Slot = RwLock<Option<Arc<Sink>>>;

/// Current sink per [`SinkKind`].
///
/// Each slot swaps whole `Arc<Sink>` values, so a record that already picked
/// up a sink finishes writing to it while the replacement takes over for the
/// next record.
#[derive(Debug, Default)]
pub(crate) struct SinkTable {
    console: Slot,
    file: Slot,
    syslog: Slot,
}

impl SinkTable {
    const fn slot(&self, kind: SinkKind) -> &Slot {
        match kind {
            SinkKind::Console => &self.console,
            SinkKind::File => &self.file,
            SinkKind::Syslog => &self.syslog,
        }
    }

    pub(crate) fn get(&self, kind: SinkKind) -> Option<Arc<Sink>> {
        self.slot(kind)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn attach(&self, kind: SinkKind, sink: Sink) {
        *self
            .slot(kind)
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(sink));
    }

    pub(crate) fn detach(&self, kind: SinkKind) -> bool {
        self.slot(kind)
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    /// Replaces the threshold of an attached sink, keeping its destination.
    pub(crate) fn retune(&self, kind: SinkKind, threshold: LevelFilter) -> bool {
        let mut slot = self
            .slot(kind)
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(current) = slot.as_ref() else {
            return false;
        };
        let retuned = Sink {
            threshold,
            destination: Arc::clone(&current.destination),
        };
        *slot = Some(Arc::new(retuned));
        true
    }

    pub(crate) fn clear(&self) {
        for kind in [SinkKind::Console, SinkKind::File, SinkKind::Syslog] {
            self.detach(kind);
        }
    }
}

/// `MakeWriter` that writes each record to the selected sinks accepting
/// its level.
#[derive(Debug, Clone)]
pub(crate) struct SinkSelection {
    table: Arc<SinkTable>,
    kinds: &'static [SinkKind],
}

impl SinkSelection {
    /// Console and file sinks, which share the timestamped format.
    pub(crate) const fn local(table: Arc<SinkTable>) -> Self {
        Self {
            table,
            kinds: &[SinkKind::Console, SinkKind::File],
        }
    }

    /// The syslog sink.
    pub(crate) const fn syslog(table: Arc<SinkTable>) -> Self {
        Self {
            table,
            kinds: &[SinkKind::Syslog],
        }
    }

    fn writer(&self, level: Level, filter: impl Fn(&Sink) -> bool) -> SinkWriter {
        let targets = self
            .kinds
            .iter()
            .filter_map(|kind| self.table.get(*kind))
            .filter(|sink| filter(sink))
            .collect();
        SinkWriter { level, targets }
    }
}

impl<'a> MakeWriter<'a> for SinkSelection {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer(Level::INFO, |_| true)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        let level = *meta.level();
        self.writer(level, |sink| sink.accepts(&level))
    }
}

/// Writer fanning one formatted record out to several sinks.
///
/// A failing sink never blocks the others.
pub(crate) struct SinkWriter {
    level: Level,
    targets: Vec<Arc<Sink>>,
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for sink in &self.targets {
            sink.destination.write(self.level, buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn retune_keeps_the_destination() {
        let table = SinkTable::default();
        table.attach(SinkKind::Console, Sink::new(LevelFilter::INFO, Destination::Console));
        let before = table.get(SinkKind::Console).expect("console attached");

        assert!(table.retune(SinkKind::Console, LevelFilter::DEBUG));

        let after = table.get(SinkKind::Console).expect("console attached");
        assert_eq!(after.threshold, LevelFilter::DEBUG);
        assert!(Arc::ptr_eq(&before.destination, &after.destination));
        assert_eq!(before.threshold, LevelFilter::INFO);
    }

    #[rstest]
    fn retune_ignores_detached_sinks() {
        let table = SinkTable::default();
        assert!(!table.retune(SinkKind::File, LevelFilter::DEBUG));
        assert!(table.get(SinkKind::File).is_none());
    }

    #[rstest]
    fn clear_detaches_everything() {
        let table = SinkTable::default();
        table.attach(SinkKind::Console, Sink::new(LevelFilter::INFO, Destination::Console));
        table.clear();
        assert!(table.get(SinkKind::Console).is_none());
    }

    #[rstest]
    #[case(Level::ERROR, true)]
    #[case(Level::WARN, true)]
    #[case(Level::INFO, false)]
    fn thresholds_filter_by_severity(#[case] level: Level, #[case] accepted: bool) {
        let sink = Sink::new(LevelFilter::WARN, Destination::Console);
        assert_eq!(sink.accepts(&level), accepted);
    }
}
