// src/store/memory.rs

use std::sync::Mutex;

use super::{SessionStore, StoredSession};

/// Armazenamento em memória, para testes e hosts que não persistem sessão.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(sessao: StoredSession) -> Self {
        Self {
            inner: Mutex::new(Some(sessao)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<StoredSession> {
        self.inner.lock().expect("lock do store envenenado").clone()
    }

    fn save(&self, sessao: &StoredSession) -> anyhow::Result<()> {
        *self.inner.lock().expect("lock do store envenenado") = Some(sessao.clone());
        Ok(())
    }

    fn update_tokens(&self, access_token: &str, refresh_token: &str) -> anyhow::Result<()> {
        let mut guard = self.inner.lock().expect("lock do store envenenado");
        if let Some(sessao) = guard.as_mut() {
            sessao.access_token = access_token.to_string();
            sessao.refresh_token = refresh_token.to_string();
        }
        Ok(())
    }

    fn clear(&self) {
        *self.inner.lock().expect("lock do store envenenado") = None;
    }
}
