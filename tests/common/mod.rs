// tests/common/mod.rs
#![allow(dead_code)]
//
// Transporte falso com respostas roteirizadas por rota, para exercitar o
// wrapper HTTP, a sessão e o workflow sem rede.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use serde_json::{Value, json};

use consorcio_client::{
    api::client::{ApiClient, ApiRequest, ApiResponse, HttpTransport},
    common::error::ApiError,
    config::ApiConfig,
    store::{MemorySessionStore, SessionStore, StoredSession},
};

#[derive(Default)]
pub struct FakeTransport {
    filas: Mutex<HashMap<String, VecDeque<Result<ApiResponse, ApiError>>>>,
    chamadas: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn chave(metodo: &str, path: &str) -> String {
        format!("{metodo} {path}")
    }

    /// Enfileira uma resposta para `metodo path`. Respostas são consumidas
    /// na ordem em que foram roteirizadas.
    pub fn roteirizar(&self, metodo: &str, path: &str, status: u16, body: Value) {
        self.filas
            .lock()
            .unwrap()
            .entry(Self::chave(metodo, path))
            .or_default()
            .push_back(Ok(ApiResponse { status, body }));
    }

    pub fn roteirizar_falha_rede(&self, metodo: &str, path: &str) {
        self.filas
            .lock()
            .unwrap()
            .entry(Self::chave(metodo, path))
            .or_default()
            .push_back(Err(ApiError::NetworkFailure("connection refused".into())));
    }

    pub fn chamadas(&self) -> Vec<ApiRequest> {
        self.chamadas.lock().unwrap().clone()
    }

    pub fn contar(&self, metodo: &str, path: &str) -> usize {
        let chave = Self::chave(metodo, path);
        self.chamadas
            .lock()
            .unwrap()
            .iter()
            .filter(|r| Self::chave(r.method.as_str(), &r.path) == chave)
            .count()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.chamadas.lock().unwrap().push(request.clone());
        let chave = Self::chave(request.method.as_str(), &request.path);
        self.filas
            .lock()
            .unwrap()
            .get_mut(&chave)
            .and_then(|fila| fila.pop_front())
            .unwrap_or_else(|| panic!("resposta não roteirizada para {chave}"))
    }
}

/// Store que delega para um `MemorySessionStore` contando as limpezas, para
/// afirmar que o estado persistido é limpo exatamente uma vez.
#[derive(Default)]
pub struct StoreContador {
    inner: MemorySessionStore,
    limpezas: AtomicUsize,
}

impl StoreContador {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn limpezas(&self) -> usize {
        self.limpezas.load(Ordering::SeqCst)
    }
}

impl SessionStore for StoreContador {
    fn load(&self) -> Option<StoredSession> {
        self.inner.load()
    }

    fn save(&self, sessao: &StoredSession) -> anyhow::Result<()> {
        self.inner.save(sessao)
    }

    fn update_tokens(&self, access_token: &str, refresh_token: &str) -> anyhow::Result<()> {
        self.inner.update_tokens(access_token, refresh_token)
    }

    fn clear(&self) {
        self.limpezas.fetch_add(1, Ordering::SeqCst);
        self.inner.clear();
    }
}

pub fn config_teste() -> ApiConfig {
    ApiConfig::new("http://backend.teste/api/v1")
}

pub fn usuario_json(perfil: Value) -> Value {
    json!({
        "id": 1,
        "nome": "Maria Souza",
        "email": "maria@corretora.com.br",
        "perfil": perfil,
        "ativo": true
    })
}

pub fn beneficio_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "cliente_id": 7,
        "unidade_id": 1,
        "tabela_credito_id": 3,
        "tipo_bem": "carro",
        "prazo_grupo": 80,
        "valor_credito": 60000.0,
        "parcela": 950.0,
        "fundo_reserva": 2.0,
        "taxa_administracao": 16.0,
        "indice_correcao": "IPCA",
        "status": status,
        "created_at": "2025-03-10T14:30:00Z"
    })
}

pub fn sessao_persistida(store: &dyn SessionStore, access: &str, refresh: &str) {
    let usuario = serde_json::from_value(usuario_json(json!("gerente"))).unwrap();
    store
        .save(&StoredSession {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            usuario,
        })
        .unwrap();
}

pub fn cliente_com(
    transporte: Arc<FakeTransport>,
    store: Arc<dyn SessionStore>,
) -> Arc<ApiClient> {
    Arc::new(ApiClient::with_transport(config_teste(), transporte, store))
}
