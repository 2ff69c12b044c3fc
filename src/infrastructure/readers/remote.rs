//! Remote Git-hosted log mirror source.
//!
//! The nightly hosts push their logs to a dedicated "log" branch; this
//! reader queries its content API (directory listings as JSON) and raw
//! endpoint (file bytes). Every network failure, timeout, or non-200 is a
//! miss, never a fatal error: a remote outage must degrade to "fall back to
//! the next reader", not abort aggregation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::models::{Hardware, RemoteConfig};
use crate::domain::ports::{LogSelector, SourceError, SourceReader};

use super::local::mode_suffix_matches;

const TIMING_SUMMARY_PREFIX: &str = "timing_summary_";

/// One entry in a content-API directory listing.
#[derive(Debug, Deserialize)]
struct DirEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Reads nightly logs from the mirror branch over HTTP.
pub struct RemoteReader {
    client: Client,
    api_base: String,
    raw_base: String,
}

impl RemoteReader {
    pub fn new(config: &RemoteConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            raw_base: config.raw_base.trim_end_matches('/').to_string(),
        })
    }

    /// Directory listing; any failure is an empty miss.
    async fn list_dir(&self, path: &str) -> Vec<DirEntry> {
        let url = format!("{}/{}?ref=log", self.api_base, path);
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(err) => {
                warn!(%url, %err, "remote listing failed, treating as miss");
                return Vec::new();
            }
        };
        if response.status() != StatusCode::OK {
            debug!(%url, status = %response.status(), "remote listing non-200");
            return Vec::new();
        }
        match response.json::<Vec<DirEntry>>().await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(%url, %err, "remote listing payload malformed");
                Vec::new()
            }
        }
    }

    /// Raw file fetch; any failure is a miss.
    async fn fetch_raw(&self, path: &str) -> Option<String> {
        let url = format!("{}/{}", self.raw_base, path);
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(err) => {
                warn!(%url, %err, "remote fetch failed, treating as miss");
                return None;
            }
        };
        if response.status() != StatusCode::OK {
            debug!(%url, status = %response.status(), "remote fetch non-200");
            return None;
        }
        response.text().await.ok()
    }

    /// The mirror exposes no mtimes, so recency ties break on the
    /// lexicographically-last name; directory and file names embed
    /// timestamps in this layout.
    async fn latest_timing_summary(&self, base: &str, date: NaiveDate, mode_suffix: Option<&str>) -> Option<String> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let mut run_dirs: Vec<String> = self
            .list_dir(base)
            .await
            .into_iter()
            .filter(|e| e.kind == "dir" && e.name.contains(&date_str))
            .filter(|e| mode_suffix.is_none_or(|s| mode_suffix_matches(&e.name, s)))
            .map(|e| e.name)
            .collect();
        run_dirs.sort_unstable();

        for run_dir in run_dirs.into_iter().rev() {
            let dir_path = format!("{base}/{run_dir}");
            let mut files: Vec<String> = self
                .list_dir(&dir_path)
                .await
                .into_iter()
                .filter(|e| {
                    e.kind == "file"
                        && e.name.starts_with(TIMING_SUMMARY_PREFIX)
                        && e.name.ends_with(".log")
                })
                .map(|e| e.name)
                .collect();
            files.sort_unstable();
            if let Some(file) = files.last() {
                return self.fetch_raw(&format!("{dir_path}/{file}")).await;
            }
        }
        None
    }
}

#[async_trait]
impl SourceReader for RemoteReader {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn find_log(
        &self,
        hardware: Hardware,
        date: NaiveDate,
        selector: &LogSelector,
    ) -> Result<Option<String>, SourceError> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let found = match selector {
            LogSelector::CronLog { file_name } => {
                let path = format!(
                    "cron/cron_log/{}/{}/{}.log",
                    hardware.as_str(),
                    date_str,
                    file_name
                );
                self.fetch_raw(&path).await
            }
            LogSelector::TimingSummary {
                model_dirs,
                mode_suffix,
            } => {
                let mut found = None;
                for model_dir in model_dirs {
                    let base = format!("online/{model_dir}");
                    found = self
                        .latest_timing_summary(&base, date, Some(mode_suffix.as_str()))
                        .await;
                    if found.is_some() {
                        break;
                    }
                }
                found
            }
            LogSelector::SanityCheck => {
                let base = format!("test/sanity_check_log/{}", hardware.as_str());
                self.latest_timing_summary(&base, date, None).await
            }
        };
        Ok(found)
    }

    async fn list_dates(&self, hardware: Hardware) -> Result<Vec<NaiveDate>, SourceError> {
        let path = format!("cron/cron_log/{}", hardware.as_str());
        let mut dates: Vec<NaiveDate> = self
            .list_dir(&path)
            .await
            .into_iter()
            .filter(|e| e.kind == "dir")
            .filter_map(|e| NaiveDate::parse_from_str(&e.name, "%Y-%m-%d").ok())
            .collect();
        dates.sort_unstable();
        Ok(dates)
    }
}
