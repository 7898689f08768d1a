mod destination;
mod scheduler;

use std::{
    fmt,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Datelike, Local, NaiveTime, TimeDelta, TimeZone};

pub use destination::ActiveDestination;
pub use scheduler::RotationScheduler;

/// The local calendar day a log file belongs to. Maps to `<root>/YYYY/MM/DD.txt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl PartitionKey {
    pub fn from_datetime<Tz: TimeZone>(time: &DateTime<Tz>) -> Self {
        let date = time.date_naive();
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn today() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn dir_path(&self, root: &Path) -> PathBuf {
        root.join(format!("{:04}", self.year))
            .join(format!("{:02}", self.month))
    }

    pub fn file_path(&self, root: &Path) -> PathBuf {
        self.dir_path(root).join(format!("{:02}.txt", self.day))
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// First instant of the calendar day after `now`, in `now`'s time zone.
///
/// When a DST jump skips midnight the first valid minute after it is used. An ambiguous
/// midnight resolves to its earliest instant.
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let Some(tomorrow) = now.date_naive().succ_opt() else {
        return now.clone() + TimeDelta::days(1);
    };
    let midnight = tomorrow.and_time(NaiveTime::MIN);

    (0..=24 * 60)
        .find_map(|minutes| {
            tz.from_local_datetime(&(midnight + TimeDelta::minutes(minutes)))
                .earliest()
        })
        .unwrap_or_else(|| now.clone() + TimeDelta::days(1))
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
