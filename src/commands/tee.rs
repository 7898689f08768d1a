use clap::Args;
use eyre::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use daylog::logging::{DailyLogging, LogRecord, Logger};

#[derive(Args, Debug)]
pub struct Cmd {
    #[arg(
        short,
        long,
        value_parser = parse_level,
        default_value = "info",
        help = "Level every forwarded line is recorded at."
    )]
    pub level: log::Level,

    #[arg(
        short,
        long = "attr",
        value_name = "KEY=VALUE",
        value_parser = parse_attr,
        help = "Attribute appended to every forwarded line. Can be repeated."
    )]
    pub attrs: Vec<(String, String)>,
}

impl Cmd {
    pub async fn run(&self, logging: DailyLogging) -> eyre::Result<()> {
        let logger = logging.logger.clone();
        let scheduler = logging
            .init()
            .context("Failed initializing daily logging")?;

        let shutdown = CancellationToken::new();
        let rotation = scheduler.spawn(shutdown.clone());

        let forwarded = self
            .forward(BufReader::new(tokio::io::stdin()), &logger)
            .await
            .context("Failed reading stdin");

        log::debug!(target: "daylog", "stdin closed, stopping rotation");
        shutdown.cancel();

        rotation
            .await
            .context("Rotation task panicked")?
            .context("Log rotation failed")?;

        forwarded.map(|_| ())
    }

    /// Records every line of `reader` until EOF. Invalid UTF-8 is replaced rather than rejected.
    async fn forward<R>(&self, mut reader: R, logger: &Logger) -> std::io::Result<usize>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        let mut count = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                return Ok(count);
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(&['\n', '\r'][..]);
            let record = self
                .attrs
                .iter()
                .fold(LogRecord::new(self.level, line), |record, (key, value)| {
                    record.with_attr(key, value)
                });

            if let Err(err) = logger.submit(&record) {
                eprintln!("daylog: {}", err);
            }
            count += 1;
        }
    }
}

fn parse_level(level: &str) -> Result<log::Level, String> {
    level
        .parse()
        .map_err(|_| format!("unknown level '{}', expected one of error, warn, info, debug, trace", level))
}

fn parse_attr(attr: &str) -> Result<(String, String), String> {
    match attr.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", attr)),
    }
}
