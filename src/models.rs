//! Core data model for playlist resolution.
//!
//! Raw descriptors come from a playlist source; everything the resolver
//! touches is normalized up front and read-only afterwards.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::normalize::normalize;

/// Delimiter between the three fields of a descriptor text line.
pub const DESCRIPTOR_DELIMITER: &str = " --- ";

// ============================================================================
// Requested tracks
// ============================================================================

/// A requested track as it arrives from a playlist source: raw `(artists,
/// song, album)` triple, unnormalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    pub artists: String,
    pub song: String,
    pub album: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("descriptor line does not split into three \" --- \" fields: {line:?}")]
pub struct ParseDescriptorError {
    pub line: String,
}

impl TrackDescriptor {
    pub fn new(
        artists: impl Into<String>,
        song: impl Into<String>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            artists: artists.into(),
            song: song.into(),
            album: album.into(),
        }
    }

    /// Parse one `artist --- song --- album` text line. A third delimiter is
    /// not split further; everything after the second one belongs to the
    /// album field.
    pub fn parse_line(line: &str) -> Result<Self, ParseDescriptorError> {
        let mut fields = line.splitn(3, DESCRIPTOR_DELIMITER);
        match (fields.next(), fields.next(), fields.next()) {
            (Some(artists), Some(song), Some(album)) => {
                Ok(Self::new(artists.trim(), song.trim(), album.trim()))
            }
            _ => Err(ParseDescriptorError {
                line: line.to_string(),
            }),
        }
    }
}

/// Normalized form of a descriptor, ready for scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackQuery {
    pub artist: String,
    pub song: String,
    pub album: String,
    combined: String,
}

impl TrackQuery {
    pub fn new(artist: &str, song: &str, album: &str) -> Self {
        let artist = normalize(artist);
        let song = normalize(song);
        let album = normalize(album);
        let combined = format!("{artist}{song}{album}");
        Self {
            artist,
            song,
            album,
            combined,
        }
    }

    pub fn from_descriptor(descriptor: &TrackDescriptor) -> Self {
        Self::new(&descriptor.artists, &descriptor.song, &descriptor.album)
    }

    /// Concatenation of all three fields, used by the combined-score check.
    pub fn combined_key(&self) -> &str {
        &self.combined
    }
}

impl fmt::Display for TrackQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "artist: {}, song: {}, album: {}",
            self.artist, self.song, self.album
        )
    }
}

// ============================================================================
// Indexed library files
// ============================================================================

/// One indexed local audio file: normalized tag fields plus the path relative
/// to the library root (so the index is portable across mount points).
/// Read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub artist: String,
    pub song: String,
    pub album: String,
    pub path: PathBuf,
    combined: String,
}

impl LibraryEntry {
    /// Builds an entry from raw tag values; fields are normalized here so the
    /// index only ever holds comparison keys.
    pub fn new(artist: &str, song: &str, album: &str, path: impl Into<PathBuf>) -> Self {
        let artist = normalize(artist);
        let song = normalize(song);
        let album = normalize(album);
        let combined = format!("{artist}{song}{album}");
        Self {
            artist,
            song,
            album,
            path: path.into(),
            combined,
        }
    }

    /// Concatenation of all three fields, used by the combined-score check.
    pub fn combined_key(&self) -> &str {
        &self.combined
    }
}

// ============================================================================
// Resolution results
// ============================================================================

/// Names the acceptance rule that selected an entry, in the priority order
/// the rules are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// The concatenation of all three fields cleared the threshold.
    Combined,
    /// Song and album both cleared the threshold.
    SongAlbum,
    /// Artist and song both cleared the threshold.
    ArtistSong,
}

/// Outcome of resolving one query against the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// A library file cleared the threshold.
    Found {
        path: PathBuf,
        strategy: MatchStrategy,
    },
    /// No entry cleared any strategy; the normalized query is carried for
    /// diagnostics.
    NotFound { query: TrackQuery },
}

/// Batch result: resolved relative paths and not-found diagnostics, each
/// partition in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistOutcome {
    pub found: Vec<PathBuf>,
    pub not_found: Vec<TrackQuery>,
}

impl PlaylistOutcome {
    /// Number of descriptors that produced a result of either kind.
    pub fn total(&self) -> usize {
        self.found.len() + self.not_found.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================
