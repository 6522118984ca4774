//! Pick exactly one artifact out of many: filter → count → select.

use docimport_shared::Artifact;

/// What the caller asked for.
#[derive(Debug, Clone, Default)]
pub struct SelectionCriteria {
    /// Prefer the most recent artifact (also the default policy).
    pub latest: bool,
    /// Prefer the oldest artifact.
    pub earliest: bool,
    /// Case-insensitive substring of the title.
    pub name: Option<String>,
    /// Exact identifier; overrides every other criterion.
    pub artifact_id: Option<String>,
}

/// The chosen artifact and a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'a> {
    pub artifact: &'a Artifact,
    pub reason: String,
}

/// Why no artifact could be selected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no artifacts found")]
    EmptyCollection,

    #[error("cannot specify both --latest and --earliest")]
    ConflictingCriteria,

    #[error("artifact {id} not found")]
    NotFoundById { id: String },

    #[error("no artifacts matching '{name}'. Available: {}", .available.join(", "))]
    NotFoundByName { name: String, available: Vec<String> },
}

/// Select one artifact according to `criteria`.
///
/// Equal timestamps resolve to the first artifact in input order.
pub fn select_artifact<'a>(
    artifacts: &'a [Artifact],
    criteria: &SelectionCriteria,
) -> Result<Selection<'a>, SelectionError> {
    if artifacts.is_empty() {
        return Err(SelectionError::EmptyCollection);
    }
    if criteria.latest && criteria.earliest {
        return Err(SelectionError::ConflictingCriteria);
    }

    if let Some(id) = non_empty(&criteria.artifact_id) {
        let artifact = artifacts
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| SelectionError::NotFoundById { id: id.to_string() })?;
        return Ok(Selection {
            artifact,
            reason: format!("matched by ID: {id}"),
        });
    }

    let name = non_empty(&criteria.name);
    let candidates: Vec<&Artifact> = match name {
        Some(name) => {
            let needle = name.to_lowercase();
            let matched: Vec<&Artifact> = artifacts
                .iter()
                .filter(|a| a.title.to_lowercase().contains(&needle))
                .collect();
            if matched.is_empty() {
                return Err(SelectionError::NotFoundByName {
                    name: name.to_string(),
                    available: artifacts.iter().map(|a| a.title.clone()).collect(),
                });
            }
            matched
        }
        None => artifacts.iter().collect(),
    };

    let count = candidates.len();
    if count == 1 {
        let reason = if name.is_some() {
            "matched by name"
        } else {
            "only artifact"
        };
        return Ok(Selection {
            artifact: candidates[0],
            reason: reason.to_string(),
        });
    }

    // `reduce` keeps the earlier element unless a later one is strictly better.
    let (artifact, which) = if criteria.earliest {
        let pick = candidates
            .into_iter()
            .reduce(|best, a| if a.created_at < best.created_at { a } else { best });
        (pick, "earliest")
    } else {
        let pick = candidates
            .into_iter()
            .reduce(|best, a| if a.created_at > best.created_at { a } else { best });
        (pick, "latest")
    };

    let artifact = artifact.ok_or(SelectionError::EmptyCollection)?;
    Ok(Selection {
        artifact,
        reason: format!("{which} of {count} artifacts"),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn artifact(id: &str, title: &str, ts: i64) -> Artifact {
        Artifact {
            id: id.into(),
            title: title.into(),
            created_at: Utc.timestamp_opt(ts, 0).unwrap(),
        }
    }

    fn three() -> Vec<Artifact> {
        vec![
            artifact("a1", "Audio Overview", 100),
            artifact("a2", "Study Guide", 300),
            artifact("a3", "Audio Deep Dive", 200),
        ]
    }

    #[test]
    fn empty_collection_fails() {
        let err = select_artifact(&[], &SelectionCriteria::default()).unwrap_err();
        assert_eq!(err, SelectionError::EmptyCollection);
    }

    #[test]
    fn latest_and_earliest_conflict() {
        let criteria = SelectionCriteria {
            latest: true,
            earliest: true,
            ..Default::default()
        };
        let artifacts = three();
        let err = select_artifact(&artifacts, &criteria).unwrap_err();
        assert_eq!(err, SelectionError::ConflictingCriteria);
    }

    #[test]
    fn id_wins_over_everything() {
        let criteria = SelectionCriteria {
            latest: true,
            name: Some("audio".into()),
            artifact_id: Some("a2".into()),
            ..Default::default()
        };
        let artifacts = three();
        let selection = select_artifact(&artifacts, &criteria).unwrap();
        assert_eq!(selection.artifact.id, "a2");
        assert_eq!(selection.reason, "matched by ID: a2");
    }

    #[test]
    fn missing_id_fails() {
        let criteria = SelectionCriteria {
            artifact_id: Some("nope".into()),
            ..Default::default()
        };
        let artifacts = three();
        let err = select_artifact(&artifacts, &criteria).unwrap_err();
        assert_eq!(err, SelectionError::NotFoundById { id: "nope".into() });
    }

    #[test]
    fn latest_of_three() {
        let criteria = SelectionCriteria {
            latest: true,
            ..Default::default()
        };
        let artifacts = three();
        let selection = select_artifact(&artifacts, &criteria).unwrap();
        assert_eq!(selection.artifact.id, "a2");
        assert!(selection.reason.contains("latest of 3"));
    }

    #[test]
    fn default_policy_is_latest() {
        let artifacts = three();
        let selection = select_artifact(&artifacts, &SelectionCriteria::default()).unwrap();
        assert_eq!(selection.artifact.id, "a2");
        assert_eq!(selection.reason, "latest of 3 artifacts");
    }

    #[test]
    fn earliest_among_name_matches() {
        let criteria = SelectionCriteria {
            earliest: true,
            name: Some("AUDIO".into()),
            ..Default::default()
        };
        let artifacts = three();
        let selection = select_artifact(&artifacts, &criteria).unwrap();
        assert_eq!(selection.artifact.id, "a1");
        assert_eq!(selection.reason, "earliest of 2 artifacts");
    }

    #[test]
    fn single_name_match() {
        let criteria = SelectionCriteria {
            name: Some("guide".into()),
            ..Default::default()
        };
        let artifacts = three();
        let selection = select_artifact(&artifacts, &criteria).unwrap();
        assert_eq!(selection.artifact.id, "a2");
        assert_eq!(selection.reason, "matched by name");
    }

    #[test]
    fn only_artifact() {
        let one = vec![artifact("x", "Report", 5)];
        let selection = select_artifact(&one, &SelectionCriteria::default()).unwrap();
        assert_eq!(selection.reason, "only artifact");
    }

    #[test]
    fn name_not_found_lists_titles() {
        let criteria = SelectionCriteria {
            name: Some("slides".into()),
            ..Default::default()
        };
        let artifacts = three();
        let err = select_artifact(&artifacts, &criteria).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no artifacts matching 'slides'. Available: Audio Overview, Study Guide, Audio Deep Dive"
        );
    }

    #[test]
    fn equal_timestamps_keep_first_occurrence() {
        let tied = vec![
            artifact("first", "A", 50),
            artifact("second", "B", 50),
        ];
        let latest = select_artifact(&tied, &SelectionCriteria::default()).unwrap();
        assert_eq!(latest.artifact.id, "first");

        let criteria = SelectionCriteria {
            earliest: true,
            ..Default::default()
        };
        let earliest = select_artifact(&tied, &criteria).unwrap();
        assert_eq!(earliest.artifact.id, "first");
    }
}
