//! Per-model sanity-check log parsing.
//!
//! The sanity log has a different structure from every other nightly log:
//! one file holds multiple `=== <model> on <platform> ===` sections, each
//! with its own verdict and accuracy lines.

use regex::Regex;
use tracing::debug;

use crate::domain::models::{SanityModelResult, TaskStatus};

/// Parses the multi-model sanity-check timing summary.
pub struct SanityAggregator {
    section_header: Regex,
    final_result: Regex,
    average_accuracy: Regex,
    accuracy_list: Regex,
}

impl Default for SanityAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl SanityAggregator {
    pub fn new() -> Self {
        Self {
            section_header: Regex::new(r"(?m)^===\s*(.+?)\s+on\s+.+?\s*===\s*$").unwrap(),
            final_result: Regex::new(r"Final result:\s*(PASS|FAIL)").unwrap(),
            average_accuracy: Regex::new(r"Average accuracy:\s*([0-9]*\.?[0-9]+)").unwrap(),
            accuracy_list: Regex::new(r"Accuracies:\s*\[([^\]]*)\]").unwrap(),
        }
    }

    /// Extract one result per model section.
    ///
    /// A section with no extractable accuracy is dropped entirely: an
    /// accuracy-less entry is not a meaningful individual result and must
    /// not appear in the per-model set, not even as `unknown`.
    pub fn parse(&self, text: &str) -> Vec<SanityModelResult> {
        let headers: Vec<_> = self.section_header.captures_iter(text).collect();
        let mut results = Vec::with_capacity(headers.len());

        for (i, header) in headers.iter().enumerate() {
            let model_name = header[1].trim().to_string();
            let body_start = header.get(0).map_or(0, |m| m.end());
            let body_end = headers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());
            let body = &text[body_start..body_end];

            let Some(accuracy) = self.extract_accuracy(body) else {
                debug!(model = %model_name, "sanity section has no accuracy, dropping");
                continue;
            };

            let status = match self.final_result.captures(body).map(|c| c[1].to_string()) {
                Some(v) if v == "PASS" => TaskStatus::Pass,
                Some(_) => TaskStatus::Fail,
                None => TaskStatus::Unknown,
            };

            results.push(SanityModelResult {
                model_name,
                status,
                accuracy,
            });
        }

        results
    }

    /// "Average accuracy: <f>" when present, otherwise the mean of the
    /// "Accuracies: [f1, f2, ...]" list.
    fn extract_accuracy(&self, body: &str) -> Option<f64> {
        if let Some(captures) = self.average_accuracy.captures(body) {
            return captures[1].parse().ok();
        }
        let list = self.accuracy_list.captures(body)?;
        let values: Vec<f64> = list[1]
            .split(',')
            .filter_map(|v| v.trim().parse().ok())
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
