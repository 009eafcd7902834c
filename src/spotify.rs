//! Spotify Web API collaborator: token exchange and playlist retrieval.
//!
//! Everything here is thin I/O feeding [`TrackDescriptor`]s to the resolution
//! pipeline. Requests are retried on transient transport failures; HTTP-level
//! errors surface immediately.

use std::thread;
use std::time::Duration;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::models::TrackDescriptor;

const ACCOUNTS_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

/// Page size for playlist track listing; a short page terminates pagination.
const PAGE_LIMIT: usize = 50;

/// Transient transport failures are retried this many times in total.
const MAX_ATTEMPTS: usize = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);

static PLAYLIST_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"playlist/([A-Za-z0-9]+)").unwrap());

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("playlist URL does not contain a playlist id: {0}")]
    InvalidPlaylistUrl(String),

    #[error("request failed ({context}): {source}")]
    Request {
        context: &'static str,
        source: Box<ureq::Error>,
    },

    #[error("response decode failed ({context}): {source}")]
    Decode {
        context: &'static str,
        source: std::io::Error,
    },
}

/// Runs one request, retrying transport-level failures with a short delay.
fn call_with_retry(
    context: &'static str,
    mut attempt_fn: impl FnMut() -> Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response, SpotifyError> {
    let mut attempt = 1;
    loop {
        match attempt_fn() {
            Ok(response) => return Ok(response),
            Err(err @ ureq::Error::Transport(_)) if attempt < MAX_ATTEMPTS => {
                warn!("{context}: transient failure (attempt {attempt}/{MAX_ATTEMPTS}): {err}");
                attempt += 1;
                thread::sleep(RETRY_DELAY);
            }
            Err(err) => {
                return Err(SpotifyError::Request {
                    context,
                    source: Box::new(err),
                })
            }
        }
    }
}

// ============================================================================
// Response payloads
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TracksPage {
    items: Vec<PageItem>,
}

#[derive(Debug, Deserialize)]
struct PageItem {
    /// Null for tracks removed from the catalog or local-only uploads.
    track: Option<PlaylistTrack>,
}

#[derive(Debug, Deserialize)]
struct PlaylistTrack {
    name: String,
    artists: Vec<ArtistRef>,
    album: AlbumRef,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumRef {
    name: String,
}

impl PlaylistTrack {
    fn into_descriptor(self) -> TrackDescriptor {
        let artists = self
            .artists
            .into_iter()
            .map(|artist| artist.name)
            .collect::<Vec<_>>()
            .join(", ");
        TrackDescriptor::new(artists, self.name, self.album.name)
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client-credentials API client over a shared `ureq` agent.
pub struct SpotifyClient {
    agent: ureq::Agent,
    access_token: String,
}

impl SpotifyClient {
    /// Exchanges client credentials for a bearer token.
    pub fn authenticate(client_id: &str, client_secret: &str) -> Result<Self, SpotifyError> {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(15))
            .timeout_write(Duration::from_secs(15))
            .build();

        let response = call_with_retry("token exchange", || {
            agent.post(ACCOUNTS_URL).send_form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
        })?;
        let token: TokenResponse = response.into_json().map_err(|source| SpotifyError::Decode {
            context: "token exchange",
            source,
        })?;

        Ok(Self {
            agent,
            access_token: token.access_token,
        })
    }

    /// Extracts the playlist id from a share URL like
    /// `https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=...`.
    pub fn playlist_id_from_url(url: &str) -> Result<String, SpotifyError> {
        PLAYLIST_ID
            .captures(url)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| SpotifyError::InvalidPlaylistUrl(url.to_string()))
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        context: &'static str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, SpotifyError> {
        let response = call_with_retry(context, || {
            let mut request = self
                .agent
                .get(url)
                .set("Authorization", &format!("Bearer {}", self.access_token));
            for (key, value) in params {
                request = request.query(key, value);
            }
            request.call()
        })?;
        response
            .into_json()
            .map_err(|source| SpotifyError::Decode { context, source })
    }

    /// Fetches the playlist's display name.
    pub fn playlist_name(&self, playlist_id: &str) -> Result<String, SpotifyError> {
        let playlist: PlaylistResponse = self.get_json(
            "playlist lookup",
            &format!("{API_BASE}/playlists/{playlist_id}"),
            &[],
        )?;
        Ok(playlist.name)
    }

    /// Fetches every track of the playlist, following pagination until a
    /// short page. Multiple artists are joined with `", "`.
    pub fn playlist_tracks(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<TrackDescriptor>, SpotifyError> {
        let url = format!("{API_BASE}/playlists/{playlist_id}/tracks");
        let mut descriptors = Vec::new();
        let mut offset = 0usize;

        loop {
            let page: TracksPage = self.get_json(
                "playlist tracks",
                &url,
                &[
                    ("limit", PAGE_LIMIT.to_string()),
                    ("offset", offset.to_string()),
                ],
            )?;
            let page_len = page.items.len();
            descriptors.extend(
                page.items
                    .into_iter()
                    .filter_map(|item| item.track.map(PlaylistTrack::into_descriptor)),
            );
            if page_len < PAGE_LIMIT {
                break;
            }
            offset += PAGE_LIMIT;
        }

        Ok(descriptors)
    }
}

// ============================================================================
// TESTS
// ============================================================================
