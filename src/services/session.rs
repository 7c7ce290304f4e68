// src/services/session.rs

use std::{collections::HashSet, sync::Arc};

use validator::Validate;

use crate::{
    api::{auth::AuthApi, client::ApiClient, perfis::PerfisApi},
    common::error::ApiError,
    models::auth::{LoginPayload, PerfilUsuario, Usuario},
    store::{SessionStore, StoredSession},
};

/// Papel do usuário na sessão. Convivem dois modelos conforme a versão do
/// backend: o código de papel legado e o perfil com códigos de permissão
/// no formato `"<modulo>.<acao>"` (ex.: `"clientes.visualizar"`).
#[derive(Debug, Clone, PartialEq)]
pub enum Papel {
    Legado(String),
    Permissoes {
        perfil_id: i64,
        codigos: HashSet<String>,
    },
}

/// Ciclo de vida da sessão: nasce em `Carregando` e, após `restaurar` ou
/// `login`, assenta em `Autenticado` ou `NaoAutenticado`.
#[derive(Debug, Clone)]
pub enum EstadoSessao {
    Carregando,
    Autenticado { usuario: Usuario, papel: Papel },
    NaoAutenticado,
}

impl EstadoSessao {
    pub fn is_autenticado(&self) -> bool {
        matches!(self, EstadoSessao::Autenticado { .. })
    }

    pub fn is_carregando(&self) -> bool {
        matches!(self, EstadoSessao::Carregando)
    }
}

/// Dono do estado de autenticação. É um objeto explícito, injetado em quem
/// precisa de sessão — não há estado global. Invariante: há usuário corrente
/// se e somente se o estado é `Autenticado`.
pub struct SessionManager {
    auth_api: AuthApi,
    perfis_api: PerfisApi,
    store: Arc<dyn SessionStore>,
    estado: EstadoSessao,
}

impl SessionManager {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let store = client.store().clone();
        Self {
            auth_api: AuthApi::new(client.clone()),
            perfis_api: PerfisApi::new(client),
            store,
            estado: EstadoSessao::Carregando,
        }
    }

    pub fn estado(&self) -> &EstadoSessao {
        &self.estado
    }

    pub fn usuario(&self) -> Option<&Usuario> {
        match &self.estado {
            EstadoSessao::Autenticado { usuario, .. } => Some(usuario),
            _ => None,
        }
    }

    /// Restauração de sessão na inicialização: com tokens e usuário
    /// persistidos, valida a sessão pedindo o perfil atual ao backend. O
    /// usuário vem da resposta, nunca do cache possivelmente defasado.
    /// Qualquer falha limpa tudo e deixa a sessão não autenticada.
    pub async fn restaurar(&mut self) -> &EstadoSessao {
        if self.store.load().is_none() {
            self.estado = EstadoSessao::NaoAutenticado;
            return &self.estado;
        }

        match self.auth_api.get_me().await {
            Ok(usuario) => {
                // O refresh pode ter trocado os tokens durante o get_me;
                // relê o store antes de regravar o usuário atualizado.
                if let Some(sessao) = self.store.load() {
                    let resultado = self.store.save(&StoredSession {
                        usuario: usuario.clone(),
                        ..sessao
                    });
                    if let Err(e) = resultado {
                        tracing::warn!("Falha ao regravar usuário em cache: {}", e);
                    }
                }

                let papel = self.montar_papel(&usuario).await;
                tracing::info!("Sessão restaurada para {}", usuario.email);
                self.estado = EstadoSessao::Autenticado { usuario, papel };
            }
            Err(e) => {
                tracing::info!("Sessão persistida inválida ({}); limpando", e);
                self.store.clear();
                self.estado = EstadoSessao::NaoAutenticado;
            }
        }

        &self.estado
    }

    /// Login com credenciais. Sucesso persiste os dois tokens e o usuário
    /// juntos; falha devolve a mensagem do servidor sem tocar em nada —
    /// credenciais parciais nunca são persistidas.
    pub async fn login(&mut self, email: &str, senha: &str) -> Result<Usuario, ApiError> {
        let payload = LoginPayload {
            email: email.to_string(),
            senha: senha.to_string(),
        };
        payload.validate()?;

        let tokens = self.auth_api.login(&payload.email, &payload.senha).await?;

        self.store.save(&StoredSession {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            usuario: tokens.user.clone(),
        })?;

        let papel = self.montar_papel(&tokens.user).await;
        tracing::info!("Login de {}", tokens.user.email);
        self.estado = EstadoSessao::Autenticado {
            usuario: tokens.user.clone(),
            papel,
        };

        Ok(tokens.user)
    }

    /// Logout: avisa o servidor em melhor esforço e limpa o estado local
    /// incondicionalmente. Nunca falha.
    pub async fn logout(&mut self) {
        self.auth_api.logout().await;
        self.store.clear();
        self.estado = EstadoSessao::NaoAutenticado;
        tracing::info!("Logout realizado");
    }

    /// Perfil admin satisfaz qualquer checagem, mesmo com o conjunto de
    /// permissões vazio; os demais dependem do código estar no conjunto.
    /// Não autenticado nunca tem permissão.
    pub fn tem_permissao(&self, codigo: &str) -> bool {
        let EstadoSessao::Autenticado { usuario, papel } = &self.estado else {
            return false;
        };

        if usuario.perfil.is_admin() {
            return true;
        }

        match papel {
            Papel::Legado(_) => false,
            Papel::Permissoes { codigos, .. } => codigos.contains(codigo),
        }
    }

    pub fn tem_alguma_permissao(&self, codigos: &[&str]) -> bool {
        codigos.iter().any(|codigo| self.tem_permissao(codigo))
    }

    /// Checagem legada por papel, mais grosseira: compara o código do perfil
    /// com a lista permitida.
    pub fn tem_papel(&self, permitidos: &[&str]) -> bool {
        match &self.estado {
            EstadoSessao::Autenticado { usuario, .. } => {
                permitidos.contains(&usuario.perfil.codigo())
            }
            _ => false,
        }
    }

    /// Decide o modelo de papel do usuário. Perfil detalhado busca os códigos
    /// de permissão no backend; falha na busca degrada para conjunto vazio
    /// (admin não é afetado) em vez de derrubar uma sessão recém-validada.
    async fn montar_papel(&self, usuario: &Usuario) -> Papel {
        match &usuario.perfil {
            PerfilUsuario::Codigo(codigo) => Papel::Legado(codigo.clone()),
            PerfilUsuario::Detalhado(perfil) => {
                let codigos = match self.perfis_api.minhas_permissoes().await {
                    Ok(resposta) => resposta.permissoes.into_iter().collect(),
                    Err(e) => {
                        tracing::warn!("Falha ao buscar permissões: {}", e);
                        HashSet::new()
                    }
                };
                Papel::Permissoes {
                    perfil_id: perfil.id,
                    codigos,
                }
            }
        }
    }
}
