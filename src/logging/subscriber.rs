//! Tracing subscriber: coloured stderr output plus the per-command run log.
use std::fs;
use std::io::{IsTerminal as _, Write as _};
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;
use tracing::field::{Field, Visit};

use super::utils::{ISO_UTC, LINE_TIME, log_file_path, strip_ansi, utc_now};

/// Target of stage headers.
pub(super) const STAGE_TARGET: &str = "confgraph::stage";
/// Target of issues recorded while walking the import graph.
pub(super) const ISSUE_TARGET: &str = "confgraph::issue";
/// Environment variable holding an optional console filter directive.
const FILTER_ENV: &str = "CONFGRAPH_LOG";

/// How an event is presented, decided once from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Stage,
    Issue,
    Warn,
    Info,
    Detail,
}

impl Line {
    fn of(metadata: &tracing::Metadata<'_>) -> Self {
        match (*metadata.level(), metadata.target()) {
            (_, ISSUE_TARGET) => Self::Issue,
            (Level::INFO, STAGE_TARGET) => Self::Stage,
            (Level::ERROR | Level::WARN, _) => Self::Warn,
            (Level::INFO, _) => Self::Info,
            _ => Self::Detail,
        }
    }

    fn console(self, msg: &str) -> String {
        match self {
            Self::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Self::Issue => format!("\x1b[33missue\x1b[0m {msg}"),
            Self::Warn => format!("\x1b[33mwarn\x1b[0m  {msg}"),
            Self::Info => format!("  {msg}"),
            Self::Detail => format!("  \x1b[2m{msg}\x1b[0m"),
        }
    }

    fn plain(self, msg: &str) -> String {
        let tag = match self {
            Self::Stage => return format!("==> {msg}"),
            Self::Issue => "[issue] ",
            Self::Warn => "[warn] ",
            Self::Info => "",
            Self::Detail => "[debug] ",
        };
        format!("    {tag}{msg}")
    }
}

/// The `message` field of an event.
#[derive(Default)]
struct Message(String);

impl Visit for Message {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

fn message_of(event: &tracing::Event<'_>) -> String {
    let mut message = Message::default();
    event.record(&mut message);
    message.0
}

/// Appends every event to the run log, untinted and timestamped.
///
/// Events reach it at `DEBUG` and above no matter how verbose the console is.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open the run log for `command` under the cache directory.
    ///
    /// Returns `None` if the cache directory cannot be created or the file
    /// cannot be opened.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::at(&log_file_path(command)?, command)
    }

    /// Truncate `path`, write a one-line run header, and append events to it.
    pub(super) fn at(path: &Path, command: &str) -> Option<Self> {
        let version =
            option_env!("CONFGRAPH_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!("# confgraph {version} {command} {}\n", utc_now(ISO_UTC));
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let text = Line::of(event.metadata()).plain(&strip_ansi(&message_of(event)));
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "[{}] {text}", utc_now(LINE_TIME)).ok();
        }
    }
}

/// Console formatter; colours are dropped when the writer is not a terminal.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let text = Line::of(event.metadata()).console(&message_of(event));
        if writer.has_ansi_escapes() {
            writeln!(writer, "{text}")
        } else {
            writeln!(writer, "{}", strip_ansi(&text))
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console output goes to stderr so that machine-readable output (`chain`,
/// `--format json`) can own stdout. `CONFGRAPH_LOG` overrides the console
/// filter with an `EnvFilter` directive. A file layer writes all events
/// (including `debug`) to `$XDG_CACHE_HOME/confgraph/<command>.log`.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::{
        EnvFilter, Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(FILTER_ENV)
        .from_env_lossy();

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_filter(console_filter);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
