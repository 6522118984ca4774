//! Diff curated URLs against sources already present in the notebook.

use std::collections::HashSet;

use tracing::{debug, info};

use docimport_curation::normalize;
use docimport_shared::RemoteSource;

/// Output of [`reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Curated URLs not yet imported, in curated order.
    pub todo: Vec<String>,
    /// Distinct canonical URLs among the existing sources.
    pub existing_canonical: usize,
}

/// Remove already-imported URLs from `curated`.
///
/// `existing` is a snapshot taken once per run. Sources without a URL are
/// ignored; the rest are compared by canonical form, so an existing
/// `/en/start` source satisfies a curated `/start`.
pub fn reconcile(curated: &[String], existing: &[RemoteSource]) -> Reconciliation {
    let existing_canonical: HashSet<String> = existing
        .iter()
        .filter_map(|source| source.url.as_deref())
        .filter_map(|url| match normalize(url) {
            Ok(n) => Some(n.canonical),
            Err(e) => {
                debug!(url, error = %e, "ignoring existing source with unparseable URL");
                None
            }
        })
        .collect();

    let todo: Vec<String> = curated
        .iter()
        .filter(|url| !existing_canonical.contains(url.as_str()))
        .cloned()
        .collect();

    info!(
        curated = curated.len(),
        existing = existing_canonical.len(),
        todo = todo.len(),
        "reconciled against existing sources"
    );

    Reconciliation {
        todo,
        existing_canonical: existing_canonical.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str, url: Option<&str>) -> RemoteSource {
        RemoteSource {
            id: id.into(),
            title: None,
            url: url.map(String::from),
        }
    }

    fn curated() -> Vec<String> {
        vec![
            "https://h/cli".into(),
            "https://h/start".into(),
            "https://h/start/quickstart".into(),
        ]
    }

    #[test]
    fn rerun_against_full_import_is_empty() {
        let existing: Vec<RemoteSource> = curated()
            .iter()
            .enumerate()
            .map(|(i, u)| source(&i.to_string(), Some(u)))
            .collect();
        let result = reconcile(&curated(), &existing);
        assert!(result.todo.is_empty());
        assert_eq!(result.existing_canonical, 3);
    }

    #[test]
    fn localized_existing_source_matches_canonical() {
        let existing = vec![
            source("1", Some("https://h/en/start/")),
            source("2", None),
            source("3", Some("not a url")),
        ];
        let result = reconcile(&curated(), &existing);
        assert_eq!(
            result.todo,
            vec!["https://h/cli", "https://h/start/quickstart"]
        );
        assert_eq!(result.existing_canonical, 1);
    }

    #[test]
    fn preserves_curated_order() {
        let result = reconcile(&curated(), &[]);
        assert_eq!(result.todo, curated());
        assert_eq!(result.existing_canonical, 0);
    }
}
