//! Couche d'accès à l'API Web Spotify
//!
//! Ce module fournit une interface bas-niveau: chaque appel reçoit le token
//! explicitement, la gestion de son cycle de vie est faite par `SpotifyClient`.

pub mod auth;
pub mod catalog;

use crate::error::{Result, SpotifyError};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// URL du endpoint de token
pub const ACCOUNTS_URL: &str = "https://accounts.spotify.com/api/token";

/// URL de base de l'API Web
pub const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Marché par défaut (disponibilité des titres)
pub const DEFAULT_MARKET: &str = "US";

/// Client API bas-niveau pour communiquer avec Spotify
pub struct SpotifyApi {
    client: Client,
    accounts_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    market: String,
}

impl SpotifyApi {
    /// Crée une nouvelle instance de l'API
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Self::with_timeout(client_id, client_secret, Duration::from_secs(15))
    }

    pub fn with_timeout(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(SpotifyError::Configuration(
                "client_id and client_secret are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("DisMusic/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            accounts_url: ACCOUNTS_URL.to_string(),
            api_url: API_BASE_URL.to_string(),
            client_id,
            client_secret,
            market: DEFAULT_MARKET.to_string(),
        })
    }

    /// Redirige les appels (serveur de test)
    pub fn set_base_urls(&mut self, accounts_url: impl Into<String>, api_url: impl Into<String>) {
        self.accounts_url = accounts_url.into();
        self.api_url = api_url.into().trim_end_matches('/').to_string();
    }

    pub fn set_market(&mut self, market: impl Into<String>) {
        self.market = market.into();
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Effectue une requête GET sur un endpoint relatif à l'API
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.api_url, endpoint);
        self.get_url(&url, token, params).await
    }

    /// Effectue une requête GET sur une URL absolue (liens `next`)
    pub(crate) async fn get_url<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET {} with {} params", url, params.len());

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Traite la réponse HTTP
    ///
    /// Les erreurs Spotify ont la forme `{"error": {"status": 401, "message": "..."}}`
    /// sur l'API et `{"error": "invalid_client", "error_description": "..."}`
    /// sur le endpoint de token.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let status_code = status.as_u16();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text).unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            });
            warn!("Spotify API error ({}): {}", status_code, message);
            return Err(SpotifyError::from_status_code(status_code, message));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse Spotify response: {}", e);
            SpotifyError::JsonParse(e)
        })
    }
}

fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    let error = json.get("error")?;
    match error {
        Value::String(code) => Some(
            json.get("error_description")
                .and_then(Value::as_str)
                .map(|d| format!("{}: {}", code, d))
                .unwrap_or_else(|| code.clone()),
        ),
        Value::Object(_) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
