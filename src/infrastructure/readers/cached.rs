//! Cached source over the result store.
//!
//! Unlike the text sources this one answers with structured rows: a hit
//! short-circuits log resolution and classification entirely, which is why
//! the aggregator consults it before the text-level fallback chain.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::models::Hardware;
use crate::domain::ports::{RunRepository, StoredRun};

pub struct CachedReader {
    store: Arc<dyn RunRepository>,
}

impl CachedReader {
    pub fn new(store: Arc<dyn RunRepository>) -> Self {
        Self { store }
    }

    /// Stored run for the pair, if the cache has one. Store trouble is a
    /// miss here, not an error: a broken cache degrades to re-collection.
    pub async fn find_run(&self, date: NaiveDate, hardware: Hardware) -> Option<StoredRun> {
        match self.store.get_run(date, hardware).await {
            Ok(Some(stored)) => {
                debug!(%date, %hardware, "cache hit");
                Some(stored)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(%date, %hardware, %err, "cache read failed, treating as miss");
                None
            }
        }
    }

    pub async fn list_dates(&self, hardware: Hardware) -> Vec<NaiveDate> {
        match self.store.list_dates(hardware).await {
            Ok(dates) => dates,
            Err(err) => {
                warn!(%hardware, %err, "cache date listing failed");
                Vec::new()
            }
        }
    }
}
