//! Local filesystem log source.
//!
//! Layout under the configured root:
//!   cron/cron_log/{hardware}/{date}/{name}.log
//!   online/{model_dir}/*{date}*_{mode_suffix}/timing_summary_*.log
//!   test/sanity_check_log/{hardware}/*{date}*/timing_summary_*.log

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::domain::models::Hardware;
use crate::domain::ports::{LogSelector, SourceError, SourceReader};

const TIMING_SUMMARY_PREFIX: &str = "timing_summary_";

/// Reads nightly logs from the collection host's filesystem.
pub struct LocalReader {
    log_root: PathBuf,
}

impl LocalReader {
    pub fn new(log_root: impl Into<PathBuf>) -> Self {
        Self {
            log_root: log_root.into(),
        }
    }

    fn cron_log_path(&self, hardware: Hardware, date: NaiveDate, file_name: &str) -> PathBuf {
        self.log_root
            .join("cron")
            .join("cron_log")
            .join(hardware.as_str())
            .join(date.format("%Y-%m-%d").to_string())
            .join(format!("{file_name}.log"))
    }

    fn read_if_present(path: &Path) -> Result<Option<String>, SourceError> {
        if !path.is_file() {
            trace!(path = %path.display(), "no local log");
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    /// Most-recently-modified run directory for the date, then the
    /// most-recently-modified timing summary inside it. Reruns can leave
    /// several candidates for one nominal date, hence the two-level
    /// recency tiebreak.
    fn latest_timing_summary(
        &self,
        base: &Path,
        date: NaiveDate,
        mode_suffix: Option<&str>,
    ) -> Result<Option<String>, SourceError> {
        if !base.is_dir() {
            return Ok(None);
        }
        let date_str = date.format("%Y-%m-%d").to_string();

        let mut run_dirs: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in fs::read_dir(base)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !entry.path().is_dir() || !name.contains(&date_str) {
                continue;
            }
            if let Some(suffix) = mode_suffix {
                if !mode_suffix_matches(&name, suffix) {
                    continue;
                }
            }
            let modified = entry.metadata()?.modified()?;
            run_dirs.push((modified, entry.path()));
        }
        run_dirs.sort_by(|a, b| b.0.cmp(&a.0));

        for (_, dir) in run_dirs {
            if let Some(file) = newest_timing_file(&dir)? {
                debug!(file = %file.display(), "selected timing summary");
                return Ok(Some(fs::read_to_string(file)?));
            }
        }
        Ok(None)
    }
}

/// Exact-suffix boundary rule: the directory must end with `_{suffix}`,
/// so mode "online" never matches a directory ending in "online_torch_compile".
pub fn mode_suffix_matches(dir_name: &str, suffix: &str) -> bool {
    dir_name.ends_with(&format!("_{suffix}"))
}

fn newest_timing_file(dir: &Path) -> Result<Option<PathBuf>, SourceError> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(TIMING_SUMMARY_PREFIX) || !name.ends_with(".log") {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if newest.as_ref().is_none_or(|(t, _)| modified > *t) {
            newest = Some((modified, entry.path()));
        }
    }
    Ok(newest.map(|(_, p)| p))
}

#[async_trait]
impl SourceReader for LocalReader {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn find_log(
        &self,
        hardware: Hardware,
        date: NaiveDate,
        selector: &LogSelector,
    ) -> Result<Option<String>, SourceError> {
        match selector {
            LogSelector::CronLog { file_name } => {
                Self::read_if_present(&self.cron_log_path(hardware, date, file_name))
            }
            LogSelector::TimingSummary {
                model_dirs,
                mode_suffix,
            } => {
                for model_dir in model_dirs {
                    let base = self.log_root.join("online").join(model_dir);
                    if let Some(text) =
                        self.latest_timing_summary(&base, date, Some(mode_suffix.as_str()))?
                    {
                        return Ok(Some(text));
                    }
                }
                Ok(None)
            }
            LogSelector::SanityCheck => {
                let base = self
                    .log_root
                    .join("test")
                    .join("sanity_check_log")
                    .join(hardware.as_str());
                self.latest_timing_summary(&base, date, None)
            }
        }
    }

    async fn list_dates(&self, hardware: Hardware) -> Result<Vec<NaiveDate>, SourceError> {
        let base = self
            .log_root
            .join("cron")
            .join("cron_log")
            .join(hardware.as_str());
        if !base.is_dir() {
            return Ok(Vec::new());
        }
        let mut dates = Vec::new();
        for entry in fs::read_dir(&base)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Ok(date) = NaiveDate::parse_from_str(&name, "%Y-%m-%d") {
                dates.push(date);
            }
        }
        dates.sort_unstable();
        Ok(dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_boundary_rule() {
        assert!(mode_suffix_matches("run_2025-08-29_online", "online"));
        assert!(!mode_suffix_matches(
            "run_2025-08-29_online_torch_compile",
            "online"
        ));
        assert!(mode_suffix_matches(
            "run_2025-08-29_online_torch_compile",
            "online_torch_compile"
        ));
        // A bare substring is never enough.
        assert!(!mode_suffix_matches("run_online_2025-08-29", "online"));
    }

    #[tokio::test]
    async fn test_missing_root_is_a_miss_not_an_error() {
        let reader = LocalReader::new("/nonexistent/nightly/logs");
        let date = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();

        let found = reader
            .find_log(
                Hardware::Mi30x,
                date,
                &LogSelector::cron_log("unit_test"),
            )
            .await
            .unwrap();
        assert!(found.is_none());

        let dates = reader.list_dates(Hardware::Mi30x).await.unwrap();
        assert!(dates.is_empty());
    }
}
