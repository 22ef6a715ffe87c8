// MOODTUNE Remote Catalog
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE
//
// Genre search against a streaming catalog. SpotifyCatalog uses the client
// credentials flow; without credentials the catalog is simply not built and
// the selector runs local-only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{MoodError, MoodResult};

const SPOTIFY_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
const SPOTIFY_API_URL: &str = "https://api.spotify.com";

/// Tokens are refreshed this long before Spotify says they expire.
const TOKEN_SLACK: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub name: String,
    pub artist: String,
    /// Playable preview locator (usually a 30s MP3 clip).
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub genre: String,
    pub limit: u32,
    pub market: String,
}

#[async_trait]
pub trait TrackCatalog: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> MoodResult<Vec<CatalogTrack>>;

    /// Download the audio behind a preview locator.
    async fn fetch_preview(&self, locator: &str) -> MoodResult<Vec<u8>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl SpotifyCredentials {
    /// `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`. Missing or blank → `None`.
    pub fn from_env() -> Option<Self> {
        Self::from_values(
            std::env::var("SPOTIFY_CLIENT_ID").ok(),
            std::env::var("SPOTIFY_CLIENT_SECRET").ok(),
        )
    }

    pub fn from_values(id: Option<String>, secret: Option<String>) -> Option<Self> {
        let client_id = id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())?;
        let client_secret = secret.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())?;
        Some(Self {
            client_id,
            client_secret,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: String,
}

/// Decode a `/v1/search?type=track` body.
pub fn parse_search(body: &str) -> MoodResult<Vec<CatalogTrack>> {
    let resp: SearchResponse = serde_json::from_str(body).map_err(MoodError::remote)?;
    Ok(resp
        .tracks
        .items
        .into_iter()
        .map(|t| CatalogTrack {
            artist: t
                .artists
                .into_iter()
                .next()
                .map(|a| a.name)
                .unwrap_or_else(|| "Unknown Artist".to_string()),
            name: t.name,
            preview_url: t.preview_url.filter(|u| !u.is_empty()),
        })
        .collect())
}

/// Query-string pairs for a genre search.
pub fn search_params(query: &SearchQuery) -> Vec<(&'static str, String)> {
    vec![
        ("q", format!("genre:\"{}\"", query.genre)),
        ("type", "track".to_string()),
        ("limit", query.limit.to_string()),
        ("market", query.market.clone()),
    ]
}

pub struct SpotifyCatalog {
    client: reqwest::Client,
    credentials: SpotifyCredentials,
    token: Mutex<Option<AccessToken>>,
    accounts_url: String,
    api_url: String,
}

impl SpotifyCatalog {
    pub fn new(credentials: SpotifyCredentials, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            credentials,
            token: Mutex::new(None),
            accounts_url: SPOTIFY_ACCOUNTS_URL.to_string(),
            api_url: SPOTIFY_API_URL.to_string(),
        }
    }

    /// Point at a different host pair (proxies, local mocks).
    pub fn with_base_urls(mut self, accounts_url: &str, api_url: &str) -> Self {
        self.accounts_url = accounts_url.trim_end_matches('/').to_string();
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    async fn access_token(&self) -> MoodResult<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        debug!("[CATALOG] Requesting access token...");
        let resp = self
            .client
            .post(format!("{}/api/token", self.accounts_url))
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(MoodError::remote)?;

        if !resp.status().is_success() {
            return Err(MoodError::RemoteUnavailable(format!(
                "token request rejected: {}",
                resp.status()
            )));
        }

        let body: TokenResponse = resp.json().await.map_err(MoodError::remote)?;
        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(TOKEN_SLACK);
        *guard = Some(AccessToken {
            value: body.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        info!("[CATALOG] Authenticated (token valid {:?}).", lifetime);
        Ok(body.access_token)
    }
}

#[async_trait]
impl TrackCatalog for SpotifyCatalog {
    async fn search(&self, query: &SearchQuery) -> MoodResult<Vec<CatalogTrack>> {
        let token = self.access_token().await?;
        let resp = self
            .client
            .get(format!("{}/v1/search", self.api_url))
            .bearer_auth(token)
            .query(&search_params(query))
            .send()
            .await
            .map_err(MoodError::remote)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            *self.token.lock().await = None;
        }
        if !status.is_success() {
            return Err(MoodError::RemoteUnavailable(format!("search failed: {}", status)));
        }

        let body = resp.text().await.map_err(MoodError::remote)?;
        let tracks = parse_search(&body)?;
        debug!("[CATALOG] '{}' → {} tracks", query.genre, tracks.len());
        Ok(tracks)
    }

    async fn fetch_preview(&self, locator: &str) -> MoodResult<Vec<u8>> {
        let resp = self
            .client
            .get(locator)
            .send()
            .await
            .map_err(MoodError::engine)?;
        if !resp.status().is_success() {
            return Err(MoodError::Engine(format!("preview fetch failed: {}", resp.status())));
        }
        let bytes = resp.bytes().await.map_err(MoodError::engine)?;
        Ok(bytes.to_vec())
    }
}
