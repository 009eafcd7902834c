use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use playlist_localizer::index::build_index;
use playlist_localizer::models::TrackDescriptor;
use playlist_localizer::pipeline;
use playlist_localizer::playlist::write_m3u8;
use playlist_localizer::progress::format_duration;
use playlist_localizer::spotify::SpotifyClient;

#[derive(Parser)]
#[command(name = "playlist-localizer")]
#[command(about = "Resolve a playlist against a local music library and write an m3u8 file")]
struct Args {
    /// Spotify playlist URL to resolve
    #[arg(long, conflicts_with = "tracks_file")]
    playlist_url: Option<String>,

    /// Text file with one "artist --- song --- album" line per track
    #[arg(long)]
    tracks_file: Option<PathBuf>,

    /// Root directory of the local music library
    #[arg(long, env = "MUSIC_DIRECTORY")]
    library: PathBuf,

    /// Directory the .m3u8 file is written to
    #[arg(long, env = "OUTPUT_FILE_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Playlist name override (defaults to the remote playlist name, or the
    /// tracks file stem)
    #[arg(long)]
    name: Option<String>,

    /// Spotify application client id (remote mode)
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    client_id: Option<String>,

    /// Spotify application client secret (remote mode)
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET")]
    client_secret: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let started = Instant::now();

    let (descriptors, default_name) = match (&args.playlist_url, &args.tracks_file) {
        (Some(url), None) => fetch_remote(&args, url)?,
        (None, Some(path)) => read_tracks_file(path)?,
        _ => bail!("exactly one of --playlist-url or --tracks-file is required"),
    };
    let playlist_name = args.name.clone().unwrap_or(default_name);
    info!(
        "resolving {} requested tracks as playlist {playlist_name:?}",
        descriptors.len()
    );

    let index = build_index(&args.library)
        .with_context(|| format!("indexing library at {}", args.library.display()))?;
    println!(
        "Indexed {} audio files under {}",
        index.len(),
        args.library.display()
    );

    let outcome = pipeline::resolve_all(&index, &descriptors);
    let output_path = write_m3u8(&args.library, &outcome, &args.output_dir, &playlist_name)?;

    println!(
        "Wrote {} ({} resolved, {} not found) in {}",
        output_path.display(),
        outcome.found.len(),
        outcome.not_found.len(),
        format_duration(started.elapsed()),
    );
    Ok(())
}

fn fetch_remote(args: &Args, url: &str) -> Result<(Vec<TrackDescriptor>, String)> {
    let (Some(client_id), Some(client_secret)) = (&args.client_id, &args.client_secret) else {
        bail!(
            "--client-id and --client-secret (or SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET) \
             are required with --playlist-url"
        );
    };

    let playlist_id = SpotifyClient::playlist_id_from_url(url)?;
    let client = SpotifyClient::authenticate(client_id, client_secret)?;
    let name = client.playlist_name(&playlist_id)?;
    let descriptors = client.playlist_tracks(&playlist_id)?;
    Ok((descriptors, name))
}

fn read_tracks_file(path: &Path) -> Result<(Vec<TrackDescriptor>, String)> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading tracks file {}", path.display()))?;
    let descriptors = pipeline::parse_descriptor_lines(contents.lines());
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("playlist")
        .to_string();
    Ok((descriptors, name))
}
