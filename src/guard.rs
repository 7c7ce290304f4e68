// src/guard.rs

use crate::services::session::EstadoSessao;

/// Decisão de navegação. `Aguardar` cobre a janela em que a sessão ainda
/// está sendo restaurada e o host não deve renderizar nem redirecionar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisaoRota {
    Permitir,
    Aguardar,
    RedirecionarLogin,
    RedirecionarInicio,
}

/// Rota protegida: exige sessão autenticada.
pub fn rota_protegida(estado: &EstadoSessao) -> DecisaoRota {
    match estado {
        EstadoSessao::Carregando => DecisaoRota::Aguardar,
        EstadoSessao::Autenticado { .. } => DecisaoRota::Permitir,
        EstadoSessao::NaoAutenticado => DecisaoRota::RedirecionarLogin,
    }
}

/// Rota pública (tela de login): quem já está autenticado volta para o
/// início.
pub fn rota_publica(estado: &EstadoSessao) -> DecisaoRota {
    match estado {
        EstadoSessao::Carregando => DecisaoRota::Aguardar,
        EstadoSessao::Autenticado { .. } => DecisaoRota::RedirecionarInicio,
        EstadoSessao::NaoAutenticado => DecisaoRota::Permitir,
    }
}
