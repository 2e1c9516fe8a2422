use std::fmt::Write as _;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{
        format::{FormatEvent, FormatFields, Writer},
        FmtContext,
    },
    registry::LookupSpan,
};

/// Event formatter that draws each event under the span it was emitted in, so a `save` and the
/// backend calls it makes read as a tree:
///
/// ```text
///  INFO └─ save: Saved apartment name=Loft updated=false
///  WARN   └─ read_range: Retrying spreadsheets.values.get
/// ```
pub struct PrettyFormatter {
    timestamps: bool,
}

impl PrettyFormatter {
    /// `timestamps` prefixes every line with the UTC time of the event.
    pub fn new(timestamps: bool) -> Self {
        Self { timestamps }
    }
}

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[34m",
        Level::TRACE => "\x1b[35m",
    }
}

impl<S, N> FormatEvent<S, N> for PrettyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        if self.timestamps {
            write!(writer, "{} ", chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"))?;
        }

        let level = event.metadata().level();
        if writer.has_ansi_escapes() {
            write!(writer, "{}{:>5}\x1b[0m ", level_color(level), level.as_str())?;
        } else {
            write!(writer, "{:>5} ", level.as_str())?;
        }

        // Innermost span first.
        let mut spans = ctx.event_scope().into_iter().flatten();
        if let Some(innermost) = spans.next() {
            let depth = spans.count();
            writer.write_str(&"  ".repeat(depth))?;
            write!(writer, "└─ {}: ", innermost.name())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing::{info, info_span, warn};
    use tracing_subscriber::{layer::SubscriberExt, Registry};

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    fn capture(formatter: PrettyFormatter, ansi: bool, emit: impl FnOnce()) -> Vec<String> {
        let captured = Captured::default();
        let writer = captured.clone();
        let layer = tracing_subscriber::fmt::layer()
            .event_format(formatter)
            .with_ansi(ansi)
            .with_writer(move || writer.clone());

        tracing::subscriber::with_default(Registry::default().with(layer), emit);
        captured.lines()
    }

    #[test]
    fn test_events_are_drawn_under_their_span() {
        let lines = capture(PrettyFormatter::new(false), false, || {
            info!("Starting");
            let save = info_span!("save");
            let _save = save.enter();
            info!(updated = false, "Saved apartment");
            let read = info_span!("read_range");
            let _read = read.enter();
            warn!("Retrying");
        });

        assert_eq!(
            lines,
            [
                " INFO Starting",
                " INFO └─ save: Saved apartment updated=false",
                " WARN   └─ read_range: Retrying",
            ]
        );
    }

    #[test]
    fn test_colors_only_when_the_writer_takes_them() {
        let plain = capture(PrettyFormatter::new(false), false, || warn!("Plain"));
        let colored = capture(PrettyFormatter::new(false), true, || warn!("Colored"));

        assert!(!plain[0].contains('\x1b'));
        assert!(colored[0].starts_with("\x1b[33m WARN\x1b[0m "));
    }

    #[test]
    fn test_timestamp_prefix() {
        let lines = capture(PrettyFormatter::new(true), false, || info!("Stamped"));

        let (stamp, rest) = lines[0].split_once(' ').unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
        assert_eq!(rest.trim_start(), "INFO Stamped");
    }
}
