//! Library indexing: walk the music directory once and build the in-memory
//! entry list that resolution runs against.
//!
//! The index is built exactly once per run and never mutated afterwards.
//! Entry order is the filesystem enumeration order, never sorted; first-match
//! resolution depends on it staying stable for a built index.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use lofty::file::TaggedFileExt;
use lofty::prelude::Accessor;
use log::{debug, warn};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::models::LibraryEntry;
use crate::progress::create_progress_bar;

/// Extensions treated as local audio files (case-insensitive).
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "m4a", "ogg", "aac"];

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Recursively walks `root` and builds one entry per readable audio file.
///
/// A file whose tags cannot be read is logged and skipped; a missing tag
/// becomes an empty field. Only an inaccessible root is an error.
pub fn build_index(root: &Path) -> Result<Vec<LibraryEntry>> {
    if !root.is_dir() {
        bail!(
            "library root {} is not an accessible directory",
            root.display()
        );
    }

    let files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skipping unreadable entry under {}: {err}", root.display());
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_audio_file(path))
        .collect();

    let bar = create_progress_bar(files.len() as u64, "Indexing library");

    // Tag extraction dominates the build; fan it out across files. The
    // order-preserving collect keeps entries in enumeration order.
    let entries: Vec<LibraryEntry> = files
        .par_iter()
        .filter_map(|path| {
            let entry = read_entry(root, path);
            bar.inc(1);
            entry
        })
        .collect();

    bar.finish_and_clear();
    debug!(
        "indexed {} of {} audio files under {}",
        entries.len(),
        files.len(),
        root.display()
    );
    Ok(entries)
}

/// Reads one file's tags into an entry. `None` means the file is excluded
/// from the index (unreadable metadata), never that the whole build failed.
fn read_entry(root: &Path, path: &Path) -> Option<LibraryEntry> {
    let tagged = match lofty::read_from_path(path) {
        Ok(tagged) => tagged,
        Err(err) => {
            warn!("skipping {}: {err}", path.display());
            return None;
        }
    };

    let tag = tagged.primary_tag().or_else(|| tagged.first_tag());
    let artist = tag.and_then(|t| t.artist()).unwrap_or_default();
    let song = tag.and_then(|t| t.title()).unwrap_or_default();
    let album = tag.and_then(|t| t.album()).unwrap_or_default();

    let relative = path.strip_prefix(root).unwrap_or(path);
    Some(LibraryEntry::new(&artist, &song, &album, relative))
}

// ============================================================================
// TESTS
// ============================================================================

/// Minimal mono 16-bit PCM WAV, parseable by the tag reader but carrying no
/// tags at all. Shared with the serializer tests.
#[cfg(test)]
pub(crate) fn write_minimal_wav(path: &Path) {
    let sample_rate: u32 = 44100;
    let data = vec![0u8; 2048];
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes()); // block align
    bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&data);
    std::fs::write(path, bytes).unwrap();
}
