// src/config.rs

use std::{env, time::Duration};

const URL_PADRAO: &str = "http://localhost:8000/api/v1";
const TIMEOUT_PADRAO_SEGUNDOS: u64 = 30;

/// Configuração do SDK. A única variável obrigatória no ambiente é a URL
/// base do backend; o timeout vale para todas as chamadas, inclusive o refresh
/// (um refresh que estoura o timeout conta como refresh falho).
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = env::var("CONSORCIO_API_URL").unwrap_or_else(|_| URL_PADRAO.to_string());

        let timeout_segundos = match env::var("CONSORCIO_API_TIMEOUT_SEGUNDOS") {
            Ok(valor) => valor
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("CONSORCIO_API_TIMEOUT_SEGUNDOS inválido: {valor}"))?,
            Err(_) => TIMEOUT_PADRAO_SEGUNDOS,
        };

        tracing::debug!("Configuração carregada (backend em {})", base_url);

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_segundos),
        })
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(TIMEOUT_PADRAO_SEGUNDOS),
        }
    }
}
