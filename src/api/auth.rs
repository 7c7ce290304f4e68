// src/api/auth.rs

use std::sync::Arc;

use crate::{
    api::client::ApiClient,
    common::error::ApiError,
    models::auth::{TokenResponse, Usuario},
};

/// Chamadas do módulo de autenticação. O refresh não aparece aqui: ele é
/// interno ao `ApiClient`.
#[derive(Clone)]
pub struct AuthApi {
    client: Arc<ApiClient>,
}

impl AuthApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Login form-encoded, sem bearer (contrato OAuth2 do backend: os campos
    /// chamam-se `username` e `password` mesmo sendo e-mail e senha).
    pub async fn login(&self, email: &str, senha: &str) -> Result<TokenResponse, ApiError> {
        self.client
            .post_form_publico("/auth/login", &[("username", email), ("password", senha)])
            .await
    }

    pub async fn get_me(&self) -> Result<Usuario, ApiError> {
        self.client.get("/auth/me").await
    }

    /// Logout no servidor. Melhor esforço: falhas aqui são engolidas, o
    /// logout local acontece de qualquer forma. Vai direto ao transporte,
    /// sem passar pela interceptação de 401 — um token expirado neste ponto
    /// não deve gastar o refresh token nem soar como logout forçado.
    pub async fn logout(&self) {
        if let Err(e) = self.client.post_direto("/auth/logout").await {
            tracing::debug!("Logout no servidor falhou (ignorado): {}", e);
        }
    }
}
