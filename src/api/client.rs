// src/api/client.rs

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::{
    common::error::ApiError,
    config::ApiConfig,
    models::auth::RefreshResponse,
    store::SessionStore,
};

pub(crate) const ROTA_REFRESH: &str = "/auth/refresh";

/// Requisição já montada, pronta para o transporte.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub path: String,
    pub bearer: Option<String>,
    pub json: Option<Value>,
    pub form: Option<Vec<(String, String)>>,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_sucesso(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam de transporte: o `ApiClient` concentra toda a lógica de autenticação
/// e o transporte só executa a requisição. Nos testes o transporte é um fake
/// com respostas roteirizadas; em produção é o `ReqwestTransport`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Erros de transporte (sem resposta HTTP) devem vir como
    /// `ApiError::NetworkFailure`; respostas não-2xx voltam como `Ok`.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Transporte de produção sobre `reqwest`, com timeout vindo da configuração.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Falha ao construir o cliente HTTP: {e}"))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self.client.request(request.method, &request.url);

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(corpo) = &request.json {
            builder = builder.json(corpo);
        }
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let resposta = builder
            .send()
            .await
            .map_err(|e| ApiError::NetworkFailure(e.to_string()))?;

        let status = resposta.status().as_u16();
        let texto = resposta
            .text()
            .await
            .map_err(|e| ApiError::NetworkFailure(e.to_string()))?;

        // Respostas sem corpo (204) viram Null; corpo não-JSON é preservado
        // como mensagem de erro.
        let body = if texto.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&texto).unwrap_or_else(|_| json!({ "detail": texto }))
        };

        Ok(ApiResponse { status, body })
    }
}

/// Ponto único de passagem de todas as chamadas ao backend. Anexa o bearer
/// token persistido, intercepta 401 para renovar a sessão uma única vez e
/// força o logout quando o refresh falha — quem chama nunca lida com tokens.
pub struct ApiClient {
    config: ApiConfig,
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn SessionStore>,
    // Serializa refreshes concorrentes: se duas requisições tomarem 401 ao
    // mesmo tempo, só uma chama o endpoint de refresh.
    refresh_lock: Mutex<()>,
    on_sessao_invalida: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, store: Arc<dyn SessionStore>) -> anyhow::Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(config, transport, store))
    }

    pub fn with_transport(
        config: ApiConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            transport,
            store,
            refresh_lock: Mutex::new(()),
            on_sessao_invalida: None,
        }
    }

    /// Registra o aviso de sessão invalidada — o equivalente, fora do
    /// navegador, do redirecionamento para a tela de login.
    pub fn com_aviso_sessao_invalida(mut self, aviso: Arc<dyn Fn() + Send + Sync>) -> Self {
        self.on_sessao_invalida = Some(aviso);
        self
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    fn montar_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let corpo = self.executar(Method::GET, path, None, None).await?;
        Ok(serde_json::from_value(corpo)?)
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let corpo = self
            .executar(Method::POST, path, Some(serde_json::to_value(body)?), None)
            .await?;
        Ok(serde_json::from_value(corpo)?)
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let corpo = self
            .executar(Method::PUT, path, Some(serde_json::to_value(body)?), None)
            .await?;
        Ok(serde_json::from_value(corpo)?)
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let corpo = self
            .executar(Method::PATCH, path, Some(serde_json::to_value(body)?), None)
            .await?;
        Ok(serde_json::from_value(corpo)?)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.executar(Method::DELETE, path, None, None).await?;
        Ok(())
    }

    /// POST form-encoded sem bearer e sem refresh — usado apenas pelo login,
    /// que por contrato do backend é `application/x-www-form-urlencoded`.
    pub async fn post_form_publico<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let request = ApiRequest {
            method: Method::POST,
            url: self.montar_url(path),
            path: path.to_string(),
            bearer: None,
            json: None,
            form: Some(
                form.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        };

        let resposta = self.transport.execute(request).await?;
        if !resposta.is_sucesso() {
            return Err(ApiError::from_resposta(resposta.status, &resposta.body));
        }
        Ok(serde_json::from_value(resposta.body)?)
    }

    /// POST autenticado sem interceptação de 401 — usado pelo logout, que é
    /// melhor esforço: um token já expirado não deve disparar renovação nem
    /// o aviso de logout forçado no meio de um logout intencional.
    pub async fn post_direto(&self, path: &str) -> Result<(), ApiError> {
        let request = ApiRequest {
            method: Method::POST,
            url: self.montar_url(path),
            path: path.to_string(),
            bearer: self.store.access_token(),
            json: Some(json!({})),
            form: None,
        };

        let resposta = self.transport.execute(request).await?;
        if !resposta.is_sucesso() {
            return Err(ApiError::from_resposta(resposta.status, &resposta.body));
        }
        Ok(())
    }

    /// Executa uma chamada autenticada. Em caso de 401 tenta renovar os
    /// tokens e reenvia a requisição exatamente uma vez; a resposta do
    /// reenvio é devolvida diretamente, sem passar de novo pelo ramo de 401
    /// — estruturalmente não existe laço de retry.
    async fn executar(
        &self,
        method: Method,
        path: &str,
        json: Option<Value>,
        form: Option<Vec<(String, String)>>,
    ) -> Result<Value, ApiError> {
        let bearer = self.store.access_token();
        let request = ApiRequest {
            method,
            url: self.montar_url(path),
            path: path.to_string(),
            bearer: bearer.clone(),
            json,
            form,
        };

        let resposta = self.transport.execute(request.clone()).await?;
        if resposta.is_sucesso() {
            return Ok(resposta.body);
        }

        if resposta.status == 401 && path != ROTA_REFRESH {
            let novo_token = self.renovar_tokens(bearer.as_deref()).await?;

            let reenvio = ApiRequest {
                bearer: Some(novo_token),
                ..request
            };
            let resposta = self.transport.execute(reenvio).await?;
            if resposta.is_sucesso() {
                return Ok(resposta.body);
            }
            return Err(ApiError::from_resposta(resposta.status, &resposta.body));
        }

        Err(ApiError::from_resposta(resposta.status, &resposta.body))
    }

    /// Renova o par de tokens. `token_usado` é o access token que acabou de
    /// ser recusado: se outro chamador já renovou enquanto esperávamos o
    /// lock, reaproveitamos o token novo em vez de gastar o refresh token.
    async fn renovar_tokens(&self, token_usado: Option<&str>) -> Result<String, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(atual) = self.store.access_token() {
            if Some(atual.as_str()) != token_usado {
                return Ok(atual);
            }
        }

        // Sem refresh token persistido não há o que renovar: propaga o 401
        // original sem mexer no armazenamento.
        let Some(refresh_token) = self.store.refresh_token() else {
            return Err(ApiError::Unauthorized);
        };

        let request = ApiRequest {
            method: Method::POST,
            url: self.montar_url(ROTA_REFRESH),
            path: ROTA_REFRESH.to_string(),
            bearer: None,
            json: Some(json!({ "refresh_token": refresh_token })),
            form: None,
        };

        let tokens: RefreshResponse = match self.transport.execute(request).await {
            Ok(resposta) if resposta.is_sucesso() => match serde_json::from_value(resposta.body) {
                Ok(tokens) => tokens,
                Err(_) => return Err(self.invalidar_sessao()),
            },
            // Refresh recusado, inalcançável ou com timeout: todos contam
            // como falha e derrubam a sessão.
            Ok(_) | Err(_) => return Err(self.invalidar_sessao()),
        };

        self.store
            .update_tokens(&tokens.access_token, &tokens.refresh_token)?;
        tracing::debug!("Tokens renovados após 401");

        Ok(tokens.access_token)
    }

    /// Limpa todo o estado persistido de uma vez e dispara o aviso de
    /// logout forçado.
    fn invalidar_sessao(&self) -> ApiError {
        tracing::warn!("Refresh de sessão falhou; forçando logout");
        self.store.clear();
        if let Some(aviso) = &self.on_sessao_invalida {
            aviso();
        }
        ApiError::SessionInvalid
    }
}
