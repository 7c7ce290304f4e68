// tests/session_tests.rs
//
// Ciclo de vida da sessão: restauração na inicialização, login/logout e as
// checagens de permissão dos dois modelos de perfil.

mod common;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use serde_json::json;

use common::{FakeTransport, StoreContador, cliente_com, config_teste, sessao_persistida, usuario_json};
use consorcio_client::{
    api::client::ApiClient,
    common::error::ApiError,
    services::session::{EstadoSessao, Papel, SessionManager},
    store::{MemorySessionStore, SessionStore},
};

fn perfil_gerente() -> serde_json::Value {
    json!({ "id": 2, "codigo": "gerente", "nome": "Gerente", "cor": "#1677ff" })
}

fn perfil_admin() -> serde_json::Value {
    json!({ "id": 1, "codigo": "admin", "nome": "Administrador", "cor": "#ff4d4f" })
}

#[tokio::test]
async fn restaurar_valida_no_backend_e_usa_o_usuario_fresco() {
    let transporte = FakeTransport::new();
    let store = Arc::new(MemorySessionStore::new());
    // Cache local defasado: o nome persistido é antigo.
    sessao_persistida(store.as_ref(), "acc", "ref");

    let mut fresco = usuario_json(perfil_gerente());
    fresco["nome"] = json!("Maria Souza Oliveira");
    transporte.roteirizar("GET", "/auth/me", 200, fresco);
    transporte.roteirizar(
        "GET",
        "/perfis/usuario/minhas-permissoes",
        200,
        json!({ "perfil": perfil_gerente(), "permissoes": ["clientes.visualizar"] }),
    );

    let cliente = cliente_com(transporte.clone(), store.clone());
    let mut sessao = SessionManager::new(cliente);
    assert!(sessao.estado().is_carregando());

    sessao.restaurar().await;

    assert!(sessao.estado().is_autenticado());
    assert_eq!(sessao.usuario().unwrap().nome, "Maria Souza Oliveira");
    // O cache persistido foi atualizado com o usuário fresco.
    assert_eq!(store.load().unwrap().usuario.nome, "Maria Souza Oliveira");
    assert!(sessao.tem_permissao("clientes.visualizar"));
    assert!(!sessao.tem_permissao("clientes.excluir"));
}

#[tokio::test]
async fn restaurar_com_get_me_falhando_limpa_tudo() {
    let transporte = FakeTransport::new();
    let store = StoreContador::new();
    sessao_persistida(store.as_ref(), "acc", "ref");

    // get_me responde 401 e o refresh também falha: sessão irrecuperável.
    transporte.roteirizar("GET", "/auth/me", 401, json!({"detail": "expirado"}));
    transporte.roteirizar("POST", "/auth/refresh", 401, json!({"detail": "revogado"}));

    let cliente = cliente_com(transporte.clone(), store.clone());
    let mut sessao = SessionManager::new(cliente);
    sessao.restaurar().await;

    assert!(matches!(sessao.estado(), EstadoSessao::NaoAutenticado));
    assert!(store.load().is_none());
    assert!(store.limpezas() >= 1);
}

#[tokio::test]
async fn restaurar_sem_sessao_persistida_nao_chama_a_rede() {
    let transporte = FakeTransport::new();
    let store = Arc::new(MemorySessionStore::new());

    let cliente = cliente_com(transporte.clone(), store);
    let mut sessao = SessionManager::new(cliente);
    sessao.restaurar().await;

    assert!(matches!(sessao.estado(), EstadoSessao::NaoAutenticado));
    assert!(transporte.chamadas().is_empty());
}

#[tokio::test]
async fn login_persiste_tokens_e_usuario_juntos() {
    let transporte = FakeTransport::new();
    let store = Arc::new(MemorySessionStore::new());

    transporte.roteirizar(
        "POST",
        "/auth/login",
        200,
        json!({
            "access_token": "acc-1",
            "refresh_token": "ref-1",
            "user": usuario_json(perfil_gerente()),
        }),
    );
    transporte.roteirizar(
        "GET",
        "/perfis/usuario/minhas-permissoes",
        200,
        json!({ "perfil": perfil_gerente(), "permissoes": ["beneficios.visualizar"] }),
    );

    let cliente = cliente_com(transporte.clone(), store.clone());
    let mut sessao = SessionManager::new(cliente);

    let usuario = sessao.login("maria@corretora.com.br", "segredo1").await.unwrap();
    assert_eq!(usuario.email, "maria@corretora.com.br");

    // Login é form-encoded, sem bearer, com os campos do contrato OAuth2.
    let primeira = &transporte.chamadas()[0];
    assert!(primeira.bearer.is_none());
    let form = primeira.form.as_ref().unwrap();
    assert!(form.contains(&("username".to_string(), "maria@corretora.com.br".to_string())));

    let persistida = store.load().unwrap();
    assert_eq!(persistida.access_token, "acc-1");
    assert_eq!(persistida.refresh_token, "ref-1");
    assert_eq!(persistida.usuario.email, "maria@corretora.com.br");
    assert!(sessao.tem_permissao("beneficios.visualizar"));
}

#[tokio::test]
async fn login_recusado_nao_persiste_nada() {
    let transporte = FakeTransport::new();
    let store = Arc::new(MemorySessionStore::new());
    transporte.roteirizar(
        "POST",
        "/auth/login",
        401,
        json!({"detail": "Email ou senha incorretos"}),
    );

    let cliente = cliente_com(transporte.clone(), store.clone());
    let mut sessao = SessionManager::new(cliente);

    let erro = sessao.login("maria@corretora.com.br", "senha-errada").await.unwrap_err();
    // A mensagem do servidor chega intacta a quem exibe o erro.
    assert!(matches!(erro, ApiError::Api { status: 401, .. }));
    assert_eq!(erro.mensagem_usuario(), "Email ou senha incorretos");
    assert!(store.load().is_none());
    assert!(!sessao.estado().is_autenticado());
    // O login nunca dispara refresh.
    assert_eq!(transporte.contar("POST", "/auth/refresh"), 0);
}

#[tokio::test]
async fn login_com_payload_invalido_nem_chama_a_rede() {
    let transporte = FakeTransport::new();
    let store = Arc::new(MemorySessionStore::new());
    let cliente = cliente_com(transporte.clone(), store);
    let mut sessao = SessionManager::new(cliente);

    let erro = sessao.login("nao-e-email", "123").await.unwrap_err();
    assert!(matches!(erro, ApiError::ValidationError(_)));
    assert!(transporte.chamadas().is_empty());
}

#[tokio::test]
async fn logout_limpa_local_mesmo_com_servidor_fora() {
    let transporte = FakeTransport::new();
    let store = Arc::new(MemorySessionStore::new());
    sessao_persistida(store.as_ref(), "acc", "ref");

    transporte.roteirizar("GET", "/auth/me", 200, usuario_json(json!("gerente")));

    let cliente = cliente_com(transporte.clone(), store.clone());
    let mut sessao = SessionManager::new(cliente);
    sessao.restaurar().await;
    assert!(sessao.estado().is_autenticado());

    transporte.roteirizar_falha_rede("POST", "/auth/logout");
    sessao.logout().await;

    assert!(matches!(sessao.estado(), EstadoSessao::NaoAutenticado));
    assert!(store.load().is_none());
}

#[tokio::test]
async fn logout_com_token_expirado_nao_renova_nem_soa_como_forcado() {
    let transporte = FakeTransport::new();
    let store = Arc::new(MemorySessionStore::new());
    sessao_persistida(store.as_ref(), "acc-expirado", "ref");

    transporte.roteirizar("GET", "/auth/me", 200, usuario_json(json!("gerente")));
    // O servidor recusa o logout com 401: melhor esforço, segue o baile.
    transporte.roteirizar("POST", "/auth/logout", 401, json!({"detail": "Token expirado"}));

    let avisos = Arc::new(AtomicUsize::new(0));
    let avisos_clone = avisos.clone();
    let cliente = Arc::new(
        ApiClient::with_transport(config_teste(), transporte.clone(), store.clone())
            .com_aviso_sessao_invalida(Arc::new(move || {
                avisos_clone.fetch_add(1, Ordering::SeqCst);
            })),
    );
    let mut sessao = SessionManager::new(cliente);
    sessao.restaurar().await;
    assert!(sessao.estado().is_autenticado());

    sessao.logout().await;

    assert!(matches!(sessao.estado(), EstadoSessao::NaoAutenticado));
    assert!(store.load().is_none());
    // Logout intencional não gasta o refresh token nem soa como forçado.
    assert_eq!(transporte.contar("POST", "/auth/refresh"), 0);
    assert_eq!(avisos.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn admin_passa_em_qualquer_permissao_mesmo_com_conjunto_vazio() {
    let transporte = FakeTransport::new();
    let store = Arc::new(MemorySessionStore::new());
    sessao_persistida(store.as_ref(), "acc", "ref");

    transporte.roteirizar("GET", "/auth/me", 200, usuario_json(perfil_admin()));
    // Busca de permissões falha: o conjunto fica vazio.
    transporte.roteirizar_falha_rede("GET", "/perfis/usuario/minhas-permissoes");

    let cliente = cliente_com(transporte.clone(), store);
    let mut sessao = SessionManager::new(cliente);
    sessao.restaurar().await;

    assert!(sessao.estado().is_autenticado());
    assert!(sessao.tem_permissao("clientes.visualizar"));
    assert!(sessao.tem_alguma_permissao(&["qualquer.coisa", "outra.coisa"]));
    assert!(sessao.tem_papel(&["admin", "gerente"]));
}

#[tokio::test]
async fn perfil_legado_usa_checagem_por_papel() {
    let transporte = FakeTransport::new();
    let store = Arc::new(MemorySessionStore::new());
    sessao_persistida(store.as_ref(), "acc", "ref");

    // Perfil como código legado: nenhuma busca de permissões acontece.
    transporte.roteirizar("GET", "/auth/me", 200, usuario_json(json!("representante")));

    let cliente = cliente_com(transporte.clone(), store);
    let mut sessao = SessionManager::new(cliente);
    sessao.restaurar().await;

    assert_eq!(transporte.contar("GET", "/perfis/usuario/minhas-permissoes"), 0);
    match sessao.estado() {
        EstadoSessao::Autenticado { papel, .. } => {
            assert_eq!(*papel, Papel::Legado("representante".to_string()));
        }
        outro => panic!("esperava autenticado, veio {outro:?}"),
    }

    assert!(sessao.tem_papel(&["representante", "consultor"]));
    assert!(!sessao.tem_papel(&["admin"]));
    // Papel legado não-admin não satisfaz permissão por código.
    assert!(!sessao.tem_permissao("clientes.visualizar"));
}

#[tokio::test]
async fn nao_autenticado_nunca_tem_permissao() {
    let transporte = FakeTransport::new();
    let store = Arc::new(MemorySessionStore::new());
    let cliente = cliente_com(transporte, store);
    let mut sessao = SessionManager::new(cliente);
    sessao.restaurar().await;

    assert!(!sessao.tem_permissao("clientes.visualizar"));
    assert!(!sessao.tem_alguma_permissao(&["clientes.visualizar"]));
    assert!(!sessao.tem_papel(&["admin"]));
}
