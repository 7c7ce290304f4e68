// src/store/mod.rs

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use serde::{Deserialize, Serialize};

use crate::models::auth::Usuario;

/// Estado de sessão persistido entre execuções: os dois tokens e o usuário
/// serializado. Os três são gravados juntos e limpos juntos — o armazenamento
/// nunca fica parcialmente preenchido.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: String,
    pub usuario: Usuario,
}

/// Abstração do armazenamento de sessão, compartilhado entre o wrapper HTTP
/// (lê a cada requisição, grava no refresh) e o SessionManager (grava no
/// login, limpa no logout). Cada operação é atômica internamente.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Option<StoredSession>;

    fn save(&self, sessao: &StoredSession) -> anyhow::Result<()>;

    /// Troca apenas os tokens, preservando o usuário em cache (caminho do
    /// refresh). Sem sessão persistida, é um no-op.
    fn update_tokens(&self, access_token: &str, refresh_token: &str) -> anyhow::Result<()>;

    fn clear(&self);

    fn access_token(&self) -> Option<String> {
        self.load().map(|s| s.access_token)
    }

    fn refresh_token(&self) -> Option<String> {
        self.load().map(|s| s.refresh_token)
    }
}
