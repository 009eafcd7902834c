//! Batch resolution: requested descriptors in, partitioned outcome out.

use log::{debug, info, warn};

use crate::models::{LibraryEntry, MatchResult, PlaylistOutcome, TrackDescriptor, TrackQuery};
use crate::resolver;

/// Resolves every descriptor against the index, partitioning results into
/// found paths and not-found diagnostics. Input order is preserved within
/// each partition; the index is only ever read.
pub fn resolve_all(index: &[LibraryEntry], descriptors: &[TrackDescriptor]) -> PlaylistOutcome {
    let mut outcome = PlaylistOutcome::default();

    for descriptor in descriptors {
        let query = TrackQuery::from_descriptor(descriptor);
        match resolver::resolve(index, &query) {
            MatchResult::Found { path, strategy } => {
                debug!("{query} -> {} ({strategy:?})", path.display());
                outcome.found.push(path);
            }
            MatchResult::NotFound { query } => {
                debug!("{query} -> not found");
                outcome.not_found.push(query);
            }
        }
    }

    info!(
        "resolved {} of {} requested tracks",
        outcome.found.len(),
        descriptors.len()
    );
    outcome
}

/// Parses descriptor text lines (`artist --- song --- album`). Blank lines
/// are ignored; malformed lines are logged and skipped, the batch continues.
pub fn parse_descriptor_lines<'a>(
    lines: impl IntoIterator<Item = &'a str>,
) -> Vec<TrackDescriptor> {
    lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match TrackDescriptor::parse_line(line) {
            Ok(descriptor) => Some(descriptor),
            Err(err) => {
                warn!("{err}");
                None
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn index() -> Vec<LibraryEntry> {
        vec![
            LibraryEntry::new("daftpunk", "onemoretime", "discovery", "a.mp3"),
            LibraryEntry::new("radiohead", "karmapolice", "okcomputer", "b.mp3"),
        ]
    }

    #[test]
    fn partitions_preserve_input_order() {
        let descriptors = vec![
            TrackDescriptor::new("Radiohead", "Karma Police", "OK Computer"),
            TrackDescriptor::new("Nobody", "No Song", "No Album"),
            TrackDescriptor::new("Daft Punk", "One More Time", "Discovery"),
        ];

        let outcome = resolve_all(&index(), &descriptors);

        assert_eq!(
            outcome.found,
            vec![PathBuf::from("b.mp3"), PathBuf::from("a.mp3")]
        );
        assert_eq!(outcome.not_found.len(), 1);
        assert_eq!(outcome.not_found[0].artist, "nobody");
        assert_eq!(outcome.total(), 3);
    }

    #[test]
    fn two_requests_may_land_on_the_same_file() {
        let descriptors = vec![
            TrackDescriptor::new("Daft Punk", "One More Time", "Discovery"),
            TrackDescriptor::new("Daft Punk", "One More Time - 2001 Remaster", "Discovery"),
        ];

        let outcome = resolve_all(&index(), &descriptors);

        assert_eq!(
            outcome.found,
            vec![PathBuf::from("a.mp3"), PathBuf::from("a.mp3")]
        );
        assert!(outcome.not_found.is_empty());
    }

    #[test]
    fn empty_index_sends_everything_to_not_found() {
        let descriptors = vec![TrackDescriptor::new("A", "B", "C")];
        let outcome = resolve_all(&[], &descriptors);
        assert!(outcome.found.is_empty());
        assert_eq!(outcome.not_found.len(), 1);
    }

    #[test]
    fn malformed_and_blank_lines_are_skipped() {
        let lines = [
            "Daft Punk --- One More Time --- Discovery",
            "",
            "not a descriptor",
            "Radiohead --- Karma Police --- OK Computer",
        ];

        let descriptors = parse_descriptor_lines(lines);

        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].artists, "Daft Punk");
        assert_eq!(descriptors[1].song, "Karma Police");
    }
}
