//! Track resolution: first-match scan of the library index.

use std::path::Path;

use rustc_hash::FxHashSet;

use crate::models::{LibraryEntry, MatchResult, TrackQuery};
use crate::scoring::FieldScores;

/// Resolves one normalized query against the index.
///
/// Strictly first-match: entries are visited in index order and the first one
/// clearing any acceptance strategy wins, even if a later entry would score
/// higher. The claimed-path set spans a single call only, so across calls the
/// same file may legitimately be returned for different queries.
pub fn resolve(index: &[LibraryEntry], query: &TrackQuery) -> MatchResult {
    let mut claimed: FxHashSet<&Path> = FxHashSet::default();

    for entry in index {
        let scores = FieldScores::compute(query, entry);
        if let Some(strategy) = scores.accepted_by() {
            if claimed.insert(entry.path.as_path()) {
                return MatchResult::Found {
                    path: entry.path.clone(),
                    strategy,
                };
            }
        }
    }

    MatchResult::NotFound {
        query: query.clone(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
