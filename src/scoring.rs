//! Similarity scoring and the acceptance policy for track resolution.
//!
//! Scores are symmetric string similarities on the 0-100 scale (100 =
//! identical). One threshold gates all three acceptance strategies.

use strsim::normalized_levenshtein;

use crate::models::{LibraryEntry, MatchStrategy, TrackQuery};

// ============================================================================
// Score Threshold
// ============================================================================

/// Minimum similarity an acceptance strategy must reach.
pub const ACCEPT_THRESHOLD: f64 = 86.0;

// ============================================================================
// Similarity
// ============================================================================

/// Symmetric similarity between two normalized keys, scaled to 0-100.
///
/// Two empty keys score 100; a query with empty fields can therefore score
/// high against entries with equally sparse metadata. Callers treat that as a
/// known limitation of sparse libraries, not an error.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b) * 100.0
}

// ============================================================================
// Acceptance policy
// ============================================================================

/// Field-by-field scores for one query/entry pair.
#[derive(Debug, Clone, Copy)]
pub struct FieldScores {
    pub artist: f64,
    pub song: f64,
    pub album: f64,
    pub combined: f64,
}

impl FieldScores {
    pub fn compute(query: &TrackQuery, entry: &LibraryEntry) -> Self {
        Self {
            artist: similarity(&query.artist, &entry.artist),
            song: similarity(&query.song, &entry.song),
            album: similarity(&query.album, &entry.album),
            combined: similarity(query.combined_key(), entry.combined_key()),
        }
    }

    /// First acceptance strategy these scores clear, if any. The combined
    /// check runs first, then song+album, then artist+song.
    pub fn accepted_by(&self) -> Option<MatchStrategy> {
        if self.combined >= ACCEPT_THRESHOLD {
            Some(MatchStrategy::Combined)
        } else if self.song >= ACCEPT_THRESHOLD && self.album >= ACCEPT_THRESHOLD {
            Some(MatchStrategy::SongAlbum)
        } else if self.artist >= ACCEPT_THRESHOLD && self.song >= ACCEPT_THRESHOLD {
            Some(MatchStrategy::ArtistSong)
        } else {
            None
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
