// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const CODIGO_PERFIL_ADMIN: &str = "admin";

/// Perfil completo, quando o backend já migrou o usuário para o modelo
/// de perfis com permissões.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfilDetalhado {
    pub id: i64,
    pub codigo: String,
    pub nome: String,
    pub cor: Option<String>,
}

/// O campo `perfil` do usuário chega em dois formatos conforme a versão do
/// backend: um código de papel legado ("admin", "representante", ...) ou o
/// objeto de perfil completo. O `untagged` resolve os dois sem checagem manual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerfilUsuario {
    Detalhado(PerfilDetalhado),
    Codigo(String),
}

impl PerfilUsuario {
    pub fn codigo(&self) -> &str {
        match self {
            PerfilUsuario::Codigo(codigo) => codigo,
            PerfilUsuario::Detalhado(perfil) => &perfil.codigo,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.codigo() == CODIGO_PERFIL_ADMIN
    }
}

// Representa o usuário autenticado vindo do backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usuario {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub perfil: PerfilUsuario,
    pub cpf: Option<String>,
    pub telefone: Option<String>,
    pub unidade_id: Option<i64>,
    #[serde(default)]
    pub ativo: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub senha: String,
}

// Resposta do login e do refresh
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Usuario,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

// Resposta de GET /perfis/usuario/minhas-permissoes
#[derive(Debug, Clone, Deserialize)]
pub struct MinhasPermissoesResponse {
    pub perfil: Option<PerfilDetalhado>,
    #[serde(default)]
    pub permissoes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfil_desserializa_codigo_legado() {
        let usuario: Usuario = serde_json::from_value(serde_json::json!({
            "id": 1,
            "nome": "Maria Souza",
            "email": "maria@corretora.com.br",
            "perfil": "representante",
            "ativo": true
        }))
        .unwrap();

        assert_eq!(usuario.perfil, PerfilUsuario::Codigo("representante".into()));
        assert!(!usuario.perfil.is_admin());
    }

    #[test]
    fn perfil_desserializa_objeto_completo() {
        let usuario: Usuario = serde_json::from_value(serde_json::json!({
            "id": 2,
            "nome": "João Lima",
            "email": "joao@corretora.com.br",
            "perfil": { "id": 1, "codigo": "admin", "nome": "Administrador", "cor": "#ff0000" },
            "ativo": true
        }))
        .unwrap();

        assert_eq!(usuario.perfil.codigo(), "admin");
        assert!(usuario.perfil.is_admin());
    }

    #[test]
    fn login_payload_valida_email_e_senha() {
        let payload = LoginPayload {
            email: "nao-e-email".into(),
            senha: "123".into(),
        };
        let erros = payload.validate().unwrap_err();
        assert!(erros.field_errors().contains_key("email"));
        assert!(erros.field_errors().contains_key("senha"));
    }
}
