// src/store/file.rs

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::Context;

use super::{SessionStore, StoredSession};

/// Armazenamento de sessão em arquivo JSON. A escrita é feita em arquivo
/// temporário seguido de rename, para nunca deixar o arquivo pela metade.
/// O Mutex garante que cada leitura-modificação-escrita seja atômica
/// dentro do processo.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_file(path: &Path) -> Option<StoredSession> {
        let conteudo = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&conteudo) {
            Ok(sessao) => Some(sessao),
            Err(e) => {
                tracing::warn!("Arquivo de sessão corrompido, descartando: {}", e);
                None
            }
        }
    }

    fn write_file(&self, sessao: &StoredSession) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Falha ao criar diretório {}", dir.display()))?;
        }

        let tmp = self.path.with_extension("tmp");
        let conteudo = serde_json::to_string_pretty(sessao)?;
        fs::write(&tmp, conteudo)
            .with_context(|| format!("Falha ao gravar {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Falha ao mover {} para {}", tmp.display(), self.path.display()))?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<StoredSession> {
        let _guard = self.lock.lock().expect("lock do store envenenado");
        Self::read_file(&self.path)
    }

    fn save(&self, sessao: &StoredSession) -> anyhow::Result<()> {
        let _guard = self.lock.lock().expect("lock do store envenenado");
        self.write_file(sessao)
    }

    fn update_tokens(&self, access_token: &str, refresh_token: &str) -> anyhow::Result<()> {
        let _guard = self.lock.lock().expect("lock do store envenenado");
        let Some(mut sessao) = Self::read_file(&self.path) else {
            return Ok(());
        };
        sessao.access_token = access_token.to_string();
        sessao.refresh_token = refresh_token.to_string();
        self.write_file(&sessao)
    }

    fn clear(&self) {
        let _guard = self.lock.lock().expect("lock do store envenenado");
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!("Falha ao remover arquivo de sessão: {}", e);
            }
        }
    }
}
