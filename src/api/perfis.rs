// src/api/perfis.rs

use std::sync::Arc;

use crate::{
    api::client::ApiClient,
    common::error::ApiError,
    models::auth::MinhasPermissoesResponse,
};

#[derive(Clone)]
pub struct PerfisApi {
    client: Arc<ApiClient>,
}

impl PerfisApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Permissões do usuário logado. Para o perfil admin o backend devolve
    /// todas as permissões ativas, mas o SessionManager nem depende disso:
    /// admin passa em qualquer checagem.
    pub async fn minhas_permissoes(&self) -> Result<MinhasPermissoesResponse, ApiError> {
        self.client.get("/perfis/usuario/minhas-permissoes").await
    }
}
