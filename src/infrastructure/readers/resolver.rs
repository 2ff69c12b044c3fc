//! Source fallback orchestration.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::models::Hardware;
use crate::domain::ports::{LogSelector, SourceReader};

/// Tries an ordered list of sources until one answers.
///
/// Each reader is tried at most once per resolution; a miss (`Ok(None)`) or
/// a reader error both fall through to the next. Only when every configured
/// reader misses does the query resolve to "no log anywhere". Best-effort
/// and non-retrying within one call.
pub struct FallbackResolver {
    readers: Vec<Arc<dyn SourceReader>>,
}

impl FallbackResolver {
    pub fn new(readers: Vec<Arc<dyn SourceReader>>) -> Self {
        Self { readers }
    }

    pub async fn find_log(
        &self,
        hardware: Hardware,
        date: NaiveDate,
        selector: &LogSelector,
    ) -> Option<String> {
        for reader in &self.readers {
            match reader.find_log(hardware, date, selector).await {
                Ok(Some(text)) => {
                    debug!(source = reader.name(), "log resolved");
                    return Some(text);
                }
                Ok(None) => {
                    debug!(source = reader.name(), "miss, falling through");
                }
                Err(err) => {
                    warn!(source = reader.name(), %err, "source unavailable, falling through");
                }
            }
        }
        None
    }

    /// Union of every source's available dates, ascending and deduplicated.
    pub async fn list_dates(&self, hardware: Hardware) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        for reader in &self.readers {
            match reader.list_dates(hardware).await {
                Ok(mut found) => dates.append(&mut found),
                Err(err) => {
                    warn!(source = reader.name(), %err, "date listing unavailable");
                }
            }
        }
        dates.sort_unstable();
        dates.dedup();
        dates
    }
}
