//! The JSON audit report written after every import run.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tracing::info;

use docimport_curation::{CurationStats, FilterReason};
use docimport_shared::{DocImportError, Result};

use crate::importer::FailedImport;

/// Number of curated URLs whose filter reasons are copied into the report.
pub const SAMPLE_REASONS: usize = 100;

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    Clean,
    PartialFailure,
}

/// Everything a run did, in a shape that stays stable across runs.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub sitemap: String,
    pub seed_url: Option<String>,
    pub notebook: String,
    pub notebook_id: Option<String>,
    pub prefer_lang: String,
    pub keep_prefixes: Vec<String>,
    pub skip_prefixes: Vec<String>,
    pub raw_total: usize,
    pub curated_total: usize,
    pub existing_canonical_urls: usize,
    pub attempted: usize,
    pub todo: Vec<String>,
    pub added_success: usize,
    pub failed_count: usize,
    pub failed: Vec<FailedImport>,
    pub filter_stats: CurationStats,
    pub sample_reasons: SampleReasons,
    pub dry_run: bool,
    pub generated_at: DateTime<Utc>,
}

impl ImportReport {
    pub fn has_failures(&self) -> bool {
        self.failed_count > 0
    }

    pub fn exit_status(&self) -> ImportStatus {
        if self.has_failures() {
            ImportStatus::PartialFailure
        } else {
            ImportStatus::Clean
        }
    }
}

/// Filter reasons keyed by URL, serialized as a JSON object in curated order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleReasons(pub Vec<(String, FilterReason)>);

impl SampleReasons {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, url: &str) -> Option<&FilterReason> {
        self.0.iter().find(|(u, _)| u == url).map(|(_, r)| r)
    }
}

impl Serialize for SampleReasons {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(url, reason)| (url, reason)))
    }
}

/// Pick the reasons of the first [`SAMPLE_REASONS`] curated URLs.
pub fn sample_reasons(
    curated: &[String],
    reasons: &BTreeMap<String, FilterReason>,
) -> SampleReasons {
    SampleReasons(
        curated
            .iter()
            .take(SAMPLE_REASONS)
            .filter_map(|url| reasons.get(url).map(|r| (url.clone(), r.clone())))
            .collect(),
    )
}

/// Write `report` as pretty JSON, creating parent directories as needed.
pub fn write_report(path: &Path, report: &ImportReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DocImportError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(report)
        .map_err(|e| DocImportError::parse(format!("failed to serialize report: {e}")))?;
    std::fs::write(path, json).map_err(|e| DocImportError::io(path, e))?;

    info!(path = %path.display(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(failed: Vec<FailedImport>) -> ImportReport {
        ImportReport {
            sitemap: "https://docs.example.com/sitemap.xml".into(),
            seed_url: None,
            notebook: "Docs".into(),
            notebook_id: Some("nb-1".into()),
            prefer_lang: "en".into(),
            keep_prefixes: vec![],
            skip_prefixes: vec!["/blog".into()],
            raw_total: 3,
            curated_total: 2,
            existing_canonical_urls: 0,
            attempted: 2,
            todo: vec!["https://docs.example.com/a".into(), "https://docs.example.com/b".into()],
            added_success: 2 - failed.len(),
            failed_count: failed.len(),
            failed,
            filter_stats: CurationStats::default(),
            sample_reasons: SampleReasons::default(),
            dry_run: false,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn exit_status_tracks_failures() {
        assert_eq!(report(vec![]).exit_status(), ImportStatus::Clean);

        let failed = vec![FailedImport {
            url: "https://docs.example.com/b".into(),
            error: "remote error: HTTP 500".into(),
        }];
        assert_eq!(report(failed).exit_status(), ImportStatus::PartialFailure);
    }

    #[test]
    fn sample_is_bounded() {
        let curated: Vec<String> = (0..150).map(|i| format!("https://h/p{i:03}")).collect();
        let reasons: BTreeMap<String, FilterReason> = curated
            .iter()
            .map(|u| (u.clone(), FilterReason::KeepAll))
            .collect();

        let sample = sample_reasons(&curated, &reasons);
        assert_eq!(sample.len(), SAMPLE_REASONS);
        assert!(sample.get("https://h/p000").is_some());
        assert!(sample.get("https://h/p099").is_some());
        assert!(sample.get("https://h/p100").is_none());
    }

    #[test]
    fn sample_serializes_in_curated_order() {
        // Shallow pages first, which is not alphabetical.
        let curated: Vec<String> = vec![
            "https://h/zeta".into(),
            "https://h/alpha/deep".into(),
            "https://h/alpha/deep/er".into(),
        ];
        let reasons: BTreeMap<String, FilterReason> = curated
            .iter()
            .map(|u| (u.clone(), FilterReason::Kept("/".into())))
            .collect();

        let sample = sample_reasons(&curated, &reasons);
        let urls: Vec<&str> = sample.0.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(urls, curated);

        let json = serde_json::to_string(&sample).unwrap();
        let zeta = json.find("https://h/zeta").unwrap();
        let deep = json.find("https://h/alpha/deep\"").unwrap();
        let deeper = json.find("https://h/alpha/deep/er").unwrap();
        assert!(zeta < deep && deep < deeper, "{json}");
        assert!(json.starts_with("{"));
    }

    #[test]
    fn writes_pretty_json_with_stable_fields() {
        let dir = std::env::temp_dir().join(format!("docimport-report-{}", std::process::id()));
        let path = dir.join("nested").join("report.json");

        write_report(&path, &report(vec![])).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        for field in [
            "sitemap",
            "notebook",
            "notebook_id",
            "prefer_lang",
            "keep_prefixes",
            "skip_prefixes",
            "raw_total",
            "curated_total",
            "existing_canonical_urls",
            "attempted",
            "added_success",
            "failed",
            "filter_stats",
            "sample_reasons",
            "generated_at",
        ] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
        assert_eq!(value["filter_stats"]["trimmed_for_cap"], 0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
