// src/api/beneficios.rs

use std::sync::Arc;

use crate::{
    api::client::ApiClient,
    common::error::ApiError,
    models::beneficio::{
        Beneficio, BeneficioUpdatePayload, FaixaParcela, FaixaParcelaPayload, HistoricoStatus,
        StatusUpdatePayload,
    },
};

#[derive(Clone)]
pub struct BeneficiosApi {
    client: Arc<ApiClient>,
}

impl BeneficiosApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: i64) -> Result<Beneficio, ApiError> {
        self.client.get(&format!("/beneficios/{id}")).await
    }

    pub async fn update(
        &self,
        id: i64,
        payload: &BeneficioUpdatePayload,
    ) -> Result<Beneficio, ApiError> {
        self.client.put(&format!("/beneficios/{id}"), payload).await
    }

    /// PATCH de status. Um 400 aqui é regra de negócio do workflow
    /// (transição não permitida a partir do status atual), por isso vira
    /// `TransitionRejected` com a mensagem do servidor intacta.
    pub async fn update_status(
        &self,
        id: i64,
        payload: &StatusUpdatePayload,
    ) -> Result<Beneficio, ApiError> {
        self.client
            .patch(&format!("/beneficios/{id}/status"), payload)
            .await
            .map_err(|e| match e {
                ApiError::Api { status: 400, message } => ApiError::TransitionRejected(message),
                outro => outro,
            })
    }

    /// Histórico de mudanças de status, mais recente primeiro.
    pub async fn historico(&self, id: i64) -> Result<Vec<HistoricoStatus>, ApiError> {
        self.client.get(&format!("/beneficios/{id}/historico")).await
    }

    // --- Faixas de parcela (extensão usada no termo de adesão) ---

    pub async fn list_faixas(&self, id: i64) -> Result<Vec<FaixaParcela>, ApiError> {
        self.client.get(&format!("/beneficios/{id}/faixas")).await
    }

    pub async fn create_faixa(
        &self,
        id: i64,
        payload: &FaixaParcelaPayload,
    ) -> Result<FaixaParcela, ApiError> {
        self.client
            .post(&format!("/beneficios/{id}/faixas"), payload)
            .await
    }

    pub async fn update_faixa(
        &self,
        id: i64,
        faixa_id: i64,
        payload: &FaixaParcelaPayload,
    ) -> Result<FaixaParcela, ApiError> {
        self.client
            .put(&format!("/beneficios/{id}/faixas/{faixa_id}"), payload)
            .await
    }

    pub async fn delete_faixa(&self, id: i64, faixa_id: i64) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/beneficios/{id}/faixas/{faixa_id}"))
            .await
    }
}
