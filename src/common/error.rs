// src/common/error.rs

use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// O wrapper HTTP recupera internamente apenas o caso 401 + refresh bem-sucedido;
// todo o resto é propagado sem alteração para quem chamou.
#[derive(Debug, Error)]
pub enum ApiError {
    // 401 e o refresh também falhou (ou o refresh token foi revogado).
    // O armazenamento local já foi limpo quando este erro é retornado.
    #[error("Sessão inválida ou expirada")]
    SessionInvalid,

    // 401 sem possibilidade de refresh (sem refresh token persistido).
    // Um 401 vindo de uma resposta do servidor vira `Api` com a mensagem
    // original; esta variante é só para quando não há resposta a citar.
    #[error("Não autorizado")]
    Unauthorized,

    // Erro de validação de payload (validator), como no login.
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Campo obrigatório ausente detectado no cliente, antes de qualquer
    // chamada de rede (ex: grupo/cota no registro junto à administradora).
    #[error("Erro de validação: {0}")]
    ValidationFailed(String),

    // O servidor recusou uma transição de status (regra de negócio).
    #[error("Transição de status recusada: {0}")]
    TransitionRejected(String),

    // Qualquer outra resposta não-2xx, com a mensagem do servidor intacta.
    #[error("Erro da API ({status}): {message}")]
    Api { status: u16, message: String },

    // Falha de transporte: sem resposta, timeout, DNS etc.
    #[error("Falha de rede: {0}")]
    NetworkFailure(String),

    #[error("Erro de serialização")]
    Serialization(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado.
    #[error("Erro interno")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Mensagem adequada para exibição ao usuário final.
    pub fn mensagem_usuario(&self) -> String {
        match self {
            ApiError::ValidationFailed(msg)
            | ApiError::TransitionRejected(msg)
            | ApiError::Api { message: msg, .. } => msg.clone(),
            outro => outro.to_string(),
        }
    }

    /// Constrói o erro a partir de uma resposta não-2xx já lida, preservando
    /// a mensagem do servidor — inclusive no 401, para que um login recusado
    /// exiba "Email ou senha incorretos" e não um genérico. O backend usa o
    /// campo `detail`; mantemos `error` como fallback.
    pub fn from_resposta(status: u16, corpo: &serde_json::Value) -> Self {
        let message = corpo
            .get("detail")
            .or_else(|| corpo.get("error"))
            .and_then(|v| v.as_str())
            .unwrap_or("Ocorreu um erro inesperado.")
            .to_string();

        ApiError::Api { status, message }
    }
}
