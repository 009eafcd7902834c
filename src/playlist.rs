//! m3u8 serialization of a resolution outcome.
//!
//! The serializer owns the file-format knowledge: resolved paths become
//! `#EXTINF` entries, not-found diagnostics become comment lines. It consumes
//! a [`PlaylistOutcome`] and knows nothing about how matches were made.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::prelude::Accessor;
use log::warn;

use crate::models::PlaylistOutcome;

/// Writes `<output_dir>/<name>.m3u8` for a resolved playlist and returns the
/// output path.
///
/// Each resolved path gets a `#EXTINF:<secs>,<artist> - <title>` line read
/// back from the file's tags, then the path itself (relative to the library
/// root, the way the index stored it). Each not-found diagnostic is kept in
/// the playlist as a comment so it travels with the output file.
pub fn write_m3u8(
    library_root: &Path,
    outcome: &PlaylistOutcome,
    output_dir: &Path,
    name: &str,
) -> Result<PathBuf> {
    let output_path = output_dir.join(format!("{name}.m3u8"));
    let mut contents = String::from("#EXTM3U\n");

    for relative in &outcome.found {
        let (duration_secs, display) = extinf_fields(&library_root.join(relative));
        let _ = writeln!(contents, "#EXTINF:{duration_secs},{display}");
        let _ = writeln!(contents, "{}", relative.display());
    }

    for query in &outcome.not_found {
        let _ = writeln!(contents, "# Not found: {query}");
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    fs::write(&output_path, contents)
        .with_context(|| format!("writing playlist {}", output_path.display()))?;
    Ok(output_path)
}

/// Duration and "artist - title" display for one resolved file. A file that
/// cannot be re-read still gets an entry, with a filename-derived title.
fn extinf_fields(path: &Path) -> (u64, String) {
    let tagged = match lofty::read_from_path(path) {
        Ok(tagged) => tagged,
        Err(err) => {
            warn!("could not re-read tags for {}: {err}", path.display());
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Unknown Title");
            return (0, format!("Unknown Artist - {stem}"));
        }
    };

    let duration_secs = tagged.properties().duration().as_secs();
    let tag = tagged.primary_tag().or_else(|| tagged.first_tag());
    let artist = tag
        .and_then(|t| t.artist())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Unknown Artist".to_string());
    let title = tag
        .and_then(|t| t.title())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Unknown Title".to_string());

    (duration_secs, format!("{artist} - {title}"))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::write_minimal_wav;
    use crate::models::TrackQuery;
    use tempfile::TempDir;

    #[test]
    fn writes_header_entries_and_not_found_comments() {
        let library = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_minimal_wav(&library.path().join("song.wav"));

        let outcome = PlaylistOutcome {
            found: vec![PathBuf::from("song.wav")],
            not_found: vec![TrackQuery::new("Daft Punk", "Missing Track", "Nowhere")],
        };

        let path = write_m3u8(library.path(), &outcome, out.path(), "mix").unwrap();
        assert_eq!(path, out.path().join("mix.m3u8"));

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "#EXTM3U");
        // untagged file falls back to the unknown markers, sub-second audio
        // rounds down to zero
        assert_eq!(lines[1], "#EXTINF:0,Unknown Artist - Unknown Title");
        assert_eq!(lines[2], "song.wav");
        assert_eq!(
            lines[3],
            "# Not found: artist: daftpunk, song: missingtrack, album: nowhere"
        );
    }

    #[test]
    fn unreadable_resolved_file_still_gets_an_entry() {
        let library = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let outcome = PlaylistOutcome {
            found: vec![PathBuf::from("ghost.mp3")],
            not_found: vec![],
        };

        let path = write_m3u8(library.path(), &outcome, out.path(), "mix").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("#EXTINF:0,Unknown Artist - ghost"));
        assert!(contents.contains("ghost.mp3"));
    }

    #[test]
    fn creates_missing_output_directory() {
        let library = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let nested = out.path().join("playlists/generated");

        let outcome = PlaylistOutcome::default();
        let path = write_m3u8(library.path(), &outcome, &nested, "empty").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "#EXTM3U\n");
    }
}
