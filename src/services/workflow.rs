// src/services/workflow.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    api::{beneficios::BeneficiosApi, client::ApiClient},
    common::error::ApiError,
    models::beneficio::{
        Beneficio, BeneficioUpdatePayload, HistoricoStatus, StatusBeneficio, StatusUpdatePayload,
    },
};

/// Ações que o workflow pode oferecer para um benefício.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acao {
    Voltar,
    EnviarProposta,
    ClienteAceitou,
    ClienteRejeitou,
    GerarContrato,
    RegistrarAssinatura,
    EnviarAdministradora,
    RegistrarGrupoCota,
    GerarTermo,
    Ativar,
    Cancelar,
}

impl Acao {
    pub fn label(&self) -> &'static str {
        match self {
            Acao::Voltar => "Voltar",
            Acao::EnviarProposta => "Enviar Proposta",
            Acao::ClienteAceitou => "Cliente Aceitou",
            Acao::ClienteRejeitou => "Cliente Rejeitou",
            Acao::GerarContrato => "Gerar Contrato",
            Acao::RegistrarAssinatura => "Registrar Assinatura do Contrato",
            Acao::EnviarAdministradora => "Enviar para Administradora",
            Acao::RegistrarGrupoCota => "Registrar Grupo e Cota",
            Acao::GerarTermo => "Gerar Termo de Adesão",
            Acao::Ativar => "Ativar Benefício",
            Acao::Cancelar => "Cancelar Benefício",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcaoDisponivel {
    pub acao: Acao,
    pub label: &'static str,
    pub status_resultante: StatusBeneficio,
}

impl AcaoDisponivel {
    fn new(acao: Acao, status_resultante: StatusBeneficio) -> Self {
        Self {
            acao,
            label: acao.label(),
            status_resultante,
        }
    }
}

/// Dados adicionais de uma transição. Só a ação correspondente lê cada
/// campo; `administradora_id` é a extensão opcional dobrada no registro de
/// grupo/cota.
#[derive(Debug, Default, Clone)]
pub struct PayloadTransicao {
    pub motivo_rejeicao: Option<String>,
    pub motivo_cancelamento: Option<String>,
    pub grupo: Option<String>,
    pub cota: Option<String>,
    pub administradora_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorEvento {
    Verde,
    Laranja,
    Vermelho,
    Azul,
}

/// Evento já pronto para exibição na linha do tempo do benefício.
#[derive(Debug, Clone, PartialEq)]
pub struct EventoTimeline {
    pub cor: CorEvento,
    pub titulo: String,
    pub usuario_nome: Option<String>,
    pub observacao: Option<String>,
    pub data: Option<DateTime<Utc>>,
}

/// Controla o workflow de status do benefício: deriva as ações válidas do
/// status atual, dispara a transição correspondente no backend e monta a
/// linha do tempo a partir do histórico. O status exibido só muda depois de
/// uma resposta confirmada do servidor — não há atualização otimista.
#[derive(Clone)]
pub struct BeneficioWorkflow {
    api: BeneficiosApi,
}

impl BeneficioWorkflow {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            api: BeneficiosApi::new(client),
        }
    }

    /// Ações válidas para o status atual, derivadas apenas da tabela de
    /// transições — nenhuma chamada de rede. Ordem fixa: voltar primeiro,
    /// depois a(s) ação(ões) de avanço, cancelar por último. Estados
    /// terminais não oferecem nada.
    pub fn acoes_disponiveis(beneficio: &Beneficio) -> Vec<AcaoDisponivel> {
        let status = beneficio.status;
        if status.is_terminal() {
            return Vec::new();
        }

        let mut acoes = Vec::new();

        if let Some(anterior) = status.anterior() {
            acoes.push(AcaoDisponivel::new(Acao::Voltar, anterior));
        }

        match status {
            StatusBeneficio::Rascunho => {
                acoes.push(AcaoDisponivel::new(Acao::EnviarProposta, StatusBeneficio::Proposto));
            }
            StatusBeneficio::Proposto => {
                // Duas saídas mutuamente exclusivas: aceite ou rejeição.
                acoes.push(AcaoDisponivel::new(Acao::ClienteAceitou, StatusBeneficio::Aceito));
                acoes.push(AcaoDisponivel::new(Acao::ClienteRejeitou, StatusBeneficio::Rejeitado));
            }
            StatusBeneficio::Aceito => {
                acoes.push(AcaoDisponivel::new(Acao::GerarContrato, StatusBeneficio::ContratoGerado));
            }
            StatusBeneficio::ContratoGerado => {
                acoes.push(AcaoDisponivel::new(
                    Acao::RegistrarAssinatura,
                    StatusBeneficio::ContratoAssinado,
                ));
            }
            StatusBeneficio::ContratoAssinado => {
                acoes.push(AcaoDisponivel::new(
                    Acao::EnviarAdministradora,
                    StatusBeneficio::AguardandoCadastro,
                ));
            }
            StatusBeneficio::AguardandoCadastro => {
                acoes.push(AcaoDisponivel::new(
                    Acao::RegistrarGrupoCota,
                    StatusBeneficio::Cadastrado,
                ));
            }
            StatusBeneficio::Cadastrado => {
                acoes.push(AcaoDisponivel::new(Acao::GerarTermo, StatusBeneficio::TermoGerado));
            }
            StatusBeneficio::TermoGerado => {
                acoes.push(AcaoDisponivel::new(Acao::Ativar, StatusBeneficio::Ativo));
            }
            // Terminais já retornaram acima.
            StatusBeneficio::Ativo
            | StatusBeneficio::Cancelado
            | StatusBeneficio::Rejeitado => {}
        }

        acoes.push(AcaoDisponivel::new(Acao::Cancelar, StatusBeneficio::Cancelado));

        acoes
    }

    /// Aplica uma transição. Valida os campos obrigatórios no cliente antes
    /// de qualquer chamada de rede; em caso de falha do servidor nada é
    /// alterado localmente e a mensagem sobe intacta. O benefício retornado
    /// vem da resposta confirmada do servidor — cabe a quem chamou
    /// substituir o que exibe por ele.
    pub async fn aplicar_transicao(
        &self,
        beneficio: &Beneficio,
        acao: Acao,
        payload: PayloadTransicao,
    ) -> Result<Beneficio, ApiError> {
        let disponiveis = Self::acoes_disponiveis(beneficio);
        let Some(escolhida) = disponiveis.iter().find(|a| a.acao == acao) else {
            return Err(ApiError::TransitionRejected(format!(
                "Ação \"{}\" não disponível para o status {}",
                acao.label(),
                beneficio.status.label()
            )));
        };

        match acao {
            Acao::RegistrarGrupoCota => {
                let grupo = payload
                    .grupo
                    .as_deref()
                    .map(str::trim)
                    .filter(|g| !g.is_empty());
                let cota = payload
                    .cota
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty());
                let (Some(grupo), Some(cota)) = (grupo, cota) else {
                    return Err(ApiError::ValidationFailed(
                        "Informe o grupo e a cota".to_string(),
                    ));
                };

                // Grava grupo/cota (e administradora, se selecionada) antes
                // do PATCH de status, como dois passos do mesmo gesto.
                self.api
                    .update(
                        beneficio.id,
                        &BeneficioUpdatePayload {
                            grupo: Some(grupo.to_string()),
                            cota: Some(cota.to_string()),
                            administradora_id: payload.administradora_id,
                            observacoes: None,
                        },
                    )
                    .await?;

                self.atualizar_status(beneficio.id, StatusBeneficio::Cadastrado, None, None)
                    .await
            }
            Acao::ClienteRejeitou => {
                self.atualizar_status(
                    beneficio.id,
                    StatusBeneficio::Rejeitado,
                    payload.motivo_rejeicao,
                    None,
                )
                .await
            }
            Acao::Cancelar => {
                self.atualizar_status(
                    beneficio.id,
                    StatusBeneficio::Cancelado,
                    None,
                    payload.motivo_cancelamento,
                )
                .await
            }
            _ => {
                self.atualizar_status(beneficio.id, escolhida.status_resultante, None, None)
                    .await
            }
        }
    }

    async fn atualizar_status(
        &self,
        beneficio_id: i64,
        status: StatusBeneficio,
        motivo_rejeicao: Option<String>,
        motivo_cancelamento: Option<String>,
    ) -> Result<Beneficio, ApiError> {
        tracing::debug!("Benefício {}: transição para {:?}", beneficio_id, status);
        self.api
            .update_status(
                beneficio_id,
                &StatusUpdatePayload {
                    status,
                    motivo_rejeicao,
                    motivo_cancelamento,
                },
            )
            .await
    }

    pub async fn buscar(&self, beneficio_id: i64) -> Result<Beneficio, ApiError> {
        self.api.get(beneficio_id).await
    }

    pub async fn historico(&self, beneficio_id: i64) -> Result<Vec<HistoricoStatus>, ApiError> {
        self.api.historico(beneficio_id).await
    }

    /// Monta a linha do tempo em ordem cronológica: primeiro o evento
    /// sintético de criação, depois o histórico invertido (a API devolve o
    /// mais recente primeiro). Função pura: mesmas entradas, mesma saída, e
    /// nada é mutado.
    pub fn montar_timeline(
        beneficio: &Beneficio,
        historico: &[HistoricoStatus],
    ) -> Vec<EventoTimeline> {
        let mut eventos = Vec::with_capacity(historico.len() + 1);

        eventos.push(EventoTimeline {
            cor: CorEvento::Azul,
            titulo: "Benefício criado".to_string(),
            usuario_nome: None,
            observacao: None,
            data: beneficio.created_at,
        });

        for entrada in historico.iter().rev() {
            let anterior = entrada
                .status_anterior
                .map(|s| s.label())
                .unwrap_or("-");

            eventos.push(EventoTimeline {
                cor: cor_da_acao(&entrada.acao),
                titulo: format!(
                    "{}: {} -> {}",
                    label_da_acao(&entrada.acao),
                    anterior,
                    entrada.status_novo.label()
                ),
                usuario_nome: entrada.usuario_nome.clone(),
                observacao: entrada.observacao.clone(),
                data: Some(entrada.created_at),
            });
        }

        eventos
    }
}

fn cor_da_acao(acao: &str) -> CorEvento {
    match acao {
        "avancou" => CorEvento::Verde,
        "voltou" => CorEvento::Laranja,
        "rejeitou" | "cancelou" => CorEvento::Vermelho,
        _ => CorEvento::Azul,
    }
}

fn label_da_acao(acao: &str) -> &str {
    match acao {
        "avancou" => "Avançou",
        "voltou" => "Voltou",
        "rejeitou" => "Rejeitou",
        "cancelou" => "Cancelou",
        outro => outro,
    }
}
