// src/models/beneficio.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Status do benefício. O fluxo normal avança índice a índice
/// (ver `StatusBeneficio::FLUXO`); `Rejeitado` e `Cancelado` são desvios
/// terminais fora do fluxo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBeneficio {
    Rascunho,
    Proposto,
    Aceito,
    Rejeitado,
    ContratoGerado,
    ContratoAssinado,
    AguardandoCadastro,
    Cadastrado,
    TermoGerado,
    Ativo,
    Cancelado,
}

impl StatusBeneficio {
    /// Ordem de avanço do workflow, do rascunho até a ativação.
    pub const FLUXO: [StatusBeneficio; 9] = [
        StatusBeneficio::Rascunho,
        StatusBeneficio::Proposto,
        StatusBeneficio::Aceito,
        StatusBeneficio::ContratoGerado,
        StatusBeneficio::ContratoAssinado,
        StatusBeneficio::AguardandoCadastro,
        StatusBeneficio::Cadastrado,
        StatusBeneficio::TermoGerado,
        StatusBeneficio::Ativo,
    ];

    /// Posição no fluxo de avanço; `None` para os desvios terminais.
    pub fn passo(&self) -> Option<usize> {
        Self::FLUXO.iter().position(|s| s == self)
    }

    /// Status imediatamente anterior no fluxo, usado pela ação "voltar".
    pub fn anterior(&self) -> Option<StatusBeneficio> {
        match self.passo() {
            Some(passo) if passo > 0 => Some(Self::FLUXO[passo - 1]),
            _ => None,
        }
    }

    /// Estados terminais: nenhuma transição é oferecida a partir deles.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StatusBeneficio::Ativo | StatusBeneficio::Cancelado | StatusBeneficio::Rejeitado
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusBeneficio::Rascunho => "Rascunho",
            StatusBeneficio::Proposto => "Proposto",
            StatusBeneficio::Aceito => "Aceito",
            StatusBeneficio::Rejeitado => "Rejeitado",
            StatusBeneficio::ContratoGerado => "Contrato Gerado",
            StatusBeneficio::ContratoAssinado => "Contrato Assinado",
            StatusBeneficio::AguardandoCadastro => "Aguardando Cadastro",
            StatusBeneficio::Cadastrado => "Cadastrado",
            StatusBeneficio::TermoGerado => "Termo Gerado",
            StatusBeneficio::Ativo => "Ativo",
            StatusBeneficio::Cancelado => "Cancelado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoBem {
    Imovel,
    Carro,
    Moto,
}

// Benefício como vem do backend. Os campos monetários e de percentual usam
// Decimal para não perder precisão em exibição/reenvio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beneficio {
    pub id: i64,
    pub cliente_id: i64,
    pub representante_id: Option<i64>,
    pub consultor_id: Option<i64>,
    pub unidade_id: i64,
    pub empresa_id: Option<i64>,
    pub tabela_credito_id: i64,
    pub administradora_id: Option<i64>,

    pub tipo_bem: TipoBem,
    pub prazo_grupo: i32,
    pub valor_credito: Decimal,
    pub parcela: Decimal,
    pub fundo_reserva: Decimal,
    pub taxa_administracao: Decimal,
    pub indice_correcao: String,

    // Preenchidos apenas após o cadastro junto à administradora.
    pub grupo: Option<String>,
    pub cota: Option<String>,

    pub status: StatusBeneficio,

    pub motivo_rejeicao: Option<String>,
    pub motivo_cancelamento: Option<String>,
    pub observacoes: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Entrada do histórico de status. O backend devolve a lista em ordem
/// decrescente de data (mais recente primeiro).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricoStatus {
    pub acao: String,
    pub status_anterior: Option<StatusBeneficio>,
    pub status_novo: StatusBeneficio,
    pub usuario_nome: Option<String>,
    pub observacao: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Payload de PATCH /beneficios/{id}/status
#[derive(Debug, Serialize)]
pub struct StatusUpdatePayload {
    pub status: StatusBeneficio,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivo_rejeicao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivo_cancelamento: Option<String>,
}

// Payload de PUT /beneficios/{id} (registro de grupo/cota e seleção
// opcional da administradora)
#[derive(Debug, Default, Serialize)]
pub struct BeneficioUpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grupo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cota: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administradora_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
}

/// Faixa de parcela do benefício (extensão usada no termo de adesão).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaixaParcela {
    pub id: i64,
    pub beneficio_id: i64,
    pub parcela_inicio: i32,
    pub parcela_fim: i32,
    pub perc_fundo_comum: Decimal,
    pub perc_administracao: Decimal,
    pub perc_reserva: Decimal,
    pub perc_seguro: Decimal,
    pub valor_parcela: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct FaixaParcelaPayload {
    pub parcela_inicio: i32,
    pub parcela_fim: i32,
    pub perc_fundo_comum: Decimal,
    pub perc_administracao: Decimal,
    pub perc_reserva: Decimal,
    pub perc_seguro: Decimal,
    pub valor_parcela: Decimal,
}
