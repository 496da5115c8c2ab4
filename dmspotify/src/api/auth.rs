//! Authentification client-credentials (aucun utilisateur impliqué)

use super::SpotifyApi;
use crate::error::Result;
use crate::models::TokenResponse;
use async_trait::async_trait;
use dmsource::{Credential, CredentialSource, SourceError};
use std::sync::Arc;
use tracing::{debug, info};

impl SpotifyApi {
    /// Obtient un token applicatif via le grant `client_credentials`
    pub async fn request_token(&self) -> Result<TokenResponse> {
        info!("Requesting Spotify client-credentials token");

        let response = self
            .client
            .post(&self.accounts_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let token: TokenResponse = self.handle_response(response).await?;

        debug!(
            "Spotify token received (type {:?}, expires in {:?}s)",
            token.token_type, token.expires_in
        );
        Ok(token)
    }
}

/// Source de credentials pour le `CredentialCache`
///
/// L'expiration annoncée n'est pas enregistrée: le token est réutilisé
/// jusqu'à ce qu'un appel réponde 401.
pub struct ClientCredentials {
    api: Arc<SpotifyApi>,
}

impl ClientCredentials {
    pub fn new(api: Arc<SpotifyApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CredentialSource for ClientCredentials {
    async fn fetch(&self) -> dmsource::Result<Credential> {
        let token = self.api.request_token().await.map_err(SourceError::from)?;
        Ok(Credential::new(token.access_token, None))
    }
}
