use std::{fmt::Display, path::PathBuf};

use clap::{Parser, Subcommand};
use log::LevelFilter;

use daylog::{config::LogConfig, logging};

mod path;
mod tee;

#[derive(Subcommand, Debug)]
pub enum DaylogCmd {
    Tee(tee::Cmd),

    Path(path::Cmd),
}

impl Display for DaylogCmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DaylogCmd::Tee(_cmd) => write!(f, "tee"),
            DaylogCmd::Path(_cmd) => write!(f, "path"),
        }
    }
}

#[derive(Parser)]
#[command(version, long_version = "")]
#[command(about = "Fan log lines out to the terminal and to daily rotated files.", long_about = None, disable_help_subcommand = true)]
pub struct Daylog {
    #[arg(
        global = true,
        long,
        help = "Root directory for YYYY/MM/DD.txt log files. Defaults to DAYLOG_ROOT or ./logs.",
        display_order = 0
    )]
    pub root: Option<PathBuf>,

    #[arg(
        global = true,
        long,
        help = "Only write to the log files, don't mirror records to stdout.",
        display_order = 0
    )]
    pub no_console: bool,

    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::Count,
        global = true,
        help = "Restrict which records are written: -v errors only, -vv warnings, -vvv info, -vvvv debug. Everything by default.",
        display_order = 999
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: DaylogCmd,
}

impl Daylog {
    fn log_filter(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Trace,
            1 => LevelFilter::Error,
            2 => LevelFilter::Warn,
            3 => LevelFilter::Info,
            4_u8..=u8::MAX => LevelFilter::Debug,
        }
    }

    fn config(&self) -> LogConfig {
        let mut config = LogConfig::from_env().with_level(self.log_filter());

        if let Some(root) = &self.root {
            config = config.with_root(root);
        }

        if self.no_console {
            config = config.with_console(false);
        }

        config
    }

    pub fn run(self) -> eyre::Result<()> {
        let config = self.config();

        match &self.cmd {
            DaylogCmd::Path(path) => path.run(&config),
            DaylogCmd::Tee(tee) => {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()?;

                let logging = logging::Builder::from_config(config).build();
                runtime.block_on(tee.run(logging))
            }
        }
    }
}
