//! Human-readable session narration on a writer.

use std::io::Write;
use std::sync::Mutex;

use sift_loop::event::{SessionEvent, SessionEventKind, SessionEventSink};

/// Renders one event as a log line, without the timestamp prefix.
pub fn render(kind: &SessionEventKind) -> String {
    match kind {
        SessionEventKind::Started { target, mode } => match target {
            Some(target) => format!("session started: selecting {target} items, mode {mode}"),
            None => format!("session started: selecting until exhausted, mode {mode}"),
        },
        SessionEventKind::ItemSelected { identity, achieved } => {
            format!("selected {identity} ({achieved} so far)")
        }
        SessionEventKind::ItemSkipped { identity, reason } => {
            format!("skipped {identity}: {reason}")
        }
        SessionEventKind::ScrollStep { direction } => format!("scrolled {direction}"),
        SessionEventKind::IdleStep { streak } => {
            format!("no new content after scroll (streak {streak})")
        }
        SessionEventKind::DirectionFlipped { direction } => {
            format!("direction flipped, now scrolling {direction}")
        }
        SessionEventKind::Finished {
            status,
            achieved,
            processed,
        } => format!("session {status}: {achieved} selected, {processed} items decided"),
    }
}

/// Event sink that writes timestamped lines as the session runs.
pub struct ConsoleEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleEventSink {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl SessionEventSink for ConsoleEventSink {
    fn record(&self, event: SessionEvent) {
        let line = format!(
            "{} {}",
            event.timestamp.format("%H:%M:%S"),
            render(&event.kind)
        );
        let mut writer = match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = writeln!(writer, "{line}");
    }
}
