use crate::Table;
use chrono::{DateTime, Local, TimeZone};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Where one pipeline run puts its files: `<dir>/<stem>_<stamp>.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    dir: PathBuf,
    stamp: String,
}

impl RunLayout {
    pub fn new(dir: impl Into<PathBuf>, stamp: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stamp: stamp.into(),
        }
    }

    /// A layout stamped with the given local time.
    pub fn at<Tz: TimeZone>(dir: impl Into<PathBuf>, time: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self::new(dir, time.format(STAMP_FORMAT).to_string())
    }

    pub fn now(dir: impl Into<PathBuf>) -> Self {
        Self::at(dir, &Local::now())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    pub fn path(&self, table: Table) -> PathBuf {
        self.dir
            .join(format!("{}_{}.csv", table.file_stem(), self.stamp))
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.join(format!("pain_point_report_{}.md", self.stamp))
    }

    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }
}
