//! Extraction du token web Apple Music
//!
//! Le client web `music.apple.com` embarque un JWT développeur dans son
//! bundle JavaScript principal. Le token est extrait en trois étapes:
//!
//! 1. Récupère la page d'accueil
//! 2. Repère le script module `/assets/index-*.js`
//! 3. Cherche le JWT dans le bundle et décode son `exp`

use crate::error::{AppleMusicError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use dmsource::{Credential, CredentialSource, SourceError};
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, info};

/// Forme d'un JWT (trois segments base64url, en-tête `{"` encodé `ey`)
const TOKEN_PATTERN: &str = r"ey[\w-]+\.[\w-]+\.[\w-]+";

/// Chemin du bundle principal du client web
const BUNDLE_PATTERN: &str = r"/assets/index.*\.js$";

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Source de credentials qui lit le token du client web
pub struct WebTokenSource {
    client: Client,
    web_url: String,
}

impl WebTokenSource {
    pub fn new(client: Client, web_url: impl Into<String>) -> Self {
        Self {
            client,
            web_url: web_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Récupère un nouveau token et son expiration
    pub async fn scrape(&self) -> Result<Credential> {
        info!("Fetching Apple Music web token from {}", self.web_url);

        let home = self.get_text(&self.web_url).await?;
        let src = find_bundle_src(&home)?
            .ok_or_else(|| AppleMusicError::token("Token script not found"))?;
        let bundle_url = if src.starts_with("http") {
            src
        } else {
            format!("{}{}", self.web_url, src)
        };

        debug!("Downloading web bundle {}", bundle_url);
        let bundle = self.get_text(&bundle_url).await?;
        let token = find_token(&bundle)?
            .ok_or_else(|| AppleMusicError::token("Token not found in script"))?;
        let expires_at = token_expiry(&token)?;

        debug!("Apple Music token expires at {:?}", expires_at);
        Ok(Credential::new(token, expires_at))
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppleMusicError::token(format!(
                "{} answered {}",
                url, status
            )));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl CredentialSource for WebTokenSource {
    async fn fetch(&self) -> dmsource::Result<Credential> {
        self.scrape().await.map_err(SourceError::from)
    }
}

/// `src` du script module qui porte le bundle principal
pub fn find_bundle_src(html: &str) -> Result<Option<String>> {
    let pattern = Regex::new(BUNDLE_PATTERN)?;
    let selector = Selector::parse("script[type=module][src]")
        .map_err(|e| AppleMusicError::token(format!("Invalid selector: {:?}", e)))?;

    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .filter_map(|script| script.value().attr("src"))
        .find(|src| pattern.is_match(src))
        .map(str::to_string))
}

/// Premier JWT trouvé dans le bundle
pub fn find_token(bundle: &str) -> Result<Option<String>> {
    let pattern = Regex::new(TOKEN_PATTERN)?;
    Ok(pattern.find(bundle).map(|m| m.as_str().to_string()))
}

/// Décode la revendication `exp` du JWT; `None` si elle est absente
pub fn token_expiry(token: &str) -> Result<Option<DateTime<Utc>>> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() < 3 {
        return Err(AppleMusicError::token("Invalid token"));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| AppleMusicError::token(format!("Invalid token payload: {}", e)))?;
    let claims: Claims = serde_json::from_slice(&payload)?;

    Ok(claims
        .exp
        .and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// JWT non signé portant l'expiration donnée
    pub(crate) fn jwt_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(json!({"alg": "ES256", "kid": "K"}).to_string());
        let payload = URL_SAFE_NO_PAD.encode(json!({"iss": "T", "exp": exp}).to_string());
        format!("{}.{}.c2lnbmF0dXJl", header, payload)
    }

    #[test]
    fn test_find_bundle_src() {
        let html = r#"<html><head>
            <script type="module" src="/assets/vendor-1a2b.js"></script>
            <script src="/assets/index-legacy.js"></script>
            <script type="module" crossorigin src="/assets/index-9f8e7d.js"></script>
        </head></html>"#;
        assert_eq!(
            find_bundle_src(html).unwrap().as_deref(),
            Some("/assets/index-9f8e7d.js")
        );
        assert_eq!(find_bundle_src("<html></html>").unwrap(), None);
    }

    #[test]
    fn test_find_token_and_expiry() {
        let token = jwt_with_exp(1_900_000_000);
        let bundle = format!(r#"const a=1;const tok="{}";export{{a}}"#, token);

        let found = find_token(&bundle).unwrap().unwrap();
        assert_eq!(found, token);

        let expiry = token_expiry(&found).unwrap().unwrap();
        assert_eq!(expiry.timestamp(), 1_900_000_000);
    }

    #[test]
    fn test_token_without_exp() {
        let header = URL_SAFE_NO_PAD.encode(b"{\"alg\":\"none\"}");
        let payload = URL_SAFE_NO_PAD.encode(b"{\"iss\":\"T\"}");
        let token = format!("{}.{}.sig", header, payload);
        assert_eq!(token_expiry(&token).unwrap(), None);
    }

    #[test]
    fn test_invalid_token() {
        assert!(token_expiry("eyJhbGci.only-two").is_err());
        assert!(token_expiry("ey.!!!.sig").is_err());
    }
}
