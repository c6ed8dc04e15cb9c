use chrono::{TimeZone, Utc};
use logpulse_core::cli::generate::write_sample_logs;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A log file in its own temp directory. The directory is removed on drop.
pub struct LogFixture {
    _dir: TempDir,
    path: PathBuf,
}

impl LogFixture {
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let (dir, path) = Self::scratch();
        let mut contents = String::new();
        for line in lines {
            contents.push_str(line.as_ref());
            contents.push('\n');
        }
        fs::write(&path, contents).unwrap();
        Self { _dir: dir, path }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let (dir, path) = Self::scratch();
        fs::write(&path, bytes).unwrap();
        Self { _dir: dir, path }
    }

    /// Synthetic traffic, reproducible for a given seed.
    pub fn generated(count: usize, seed: u64) -> Self {
        let (dir, path) = Self::scratch();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let file = BufWriter::new(File::create(&path).unwrap());
        write_sample_logs(file, count, &mut StdRng::seed_from_u64(seed), start).unwrap();
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn scratch() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        (dir, path)
    }
}

pub fn json_line(level: &str, msg: &str, details: &str) -> String {
    format!(r#"{{"time":"2024-01-01T00:00:00Z","level":"{level}","msg":"{msg}","details":{details}}}"#)
}
