//! Cenários do gerenciador de transição de status.
//!
//! O commit em duas escritas (status + histórico) roda aqui contra um store
//! em memória com injeção de falha, cobrindo as rejeições sem escrita, o
//! caminho feliz e os dois desfechos da compensação.

use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use auditoria_nfe::common::error::AppError;
use auditoria_nfe::db::TransitionStore;
use auditoria_nfe::models::audit::{NewStatusEntry, StatusHistoryEntry};
use auditoria_nfe::models::fiscal::DocumentStatus;
use auditoria_nfe::services::status_service::StatusService;

const NOTA: i64 = 1;
const MOTIVO_OK: &str = "Revisado manualmente, documento correto.";

/// Store em memória com as mesmas garantias de interface do repositório
/// Postgres: duas escritas independentes, sem transação entre elas.
#[derive(Default)]
struct MemStore {
    status: Mutex<HashMap<i64, DocumentStatus>>,
    historico: Mutex<Vec<StatusHistoryEntry>>,
    // Injeção de falha
    fail_history: bool,
    fail_second_set: bool,
    set_calls: AtomicUsize,
}

impl MemStore {
    fn with_status(status: DocumentStatus) -> Self {
        let store = MemStore::default();
        store.status.lock().unwrap().insert(NOTA, status);
        store
    }

    fn status_of(&self, nota_id: i64) -> Option<DocumentStatus> {
        self.status.lock().unwrap().get(&nota_id).copied()
    }
}

fn store_error(contexto: &str) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("conexão perdida: {contexto}"))
}

#[async_trait]
impl TransitionStore for MemStore {
    async fn set_status(&self, nota_id: i64, status: DocumentStatus) -> Result<(), AppError> {
        let chamada = self.set_calls.fetch_add(1, Ordering::SeqCst);
        // A segunda chamada de set_status só acontece na compensação
        if self.fail_second_set && chamada >= 1 {
            return Err(store_error("reversão"));
        }
        self.status.lock().unwrap().insert(nota_id, status);
        Ok(())
    }

    async fn append_history(
        &self,
        entry: NewStatusEntry<'_>,
    ) -> Result<StatusHistoryEntry, AppError> {
        if self.fail_history {
            return Err(store_error("histórico"));
        }
        let gravado = StatusHistoryEntry {
            id: Uuid::new_v4(),
            nota_id: entry.nota_id,
            status_anterior: entry.status_anterior,
            status_novo: entry.status_novo,
            motivo: entry.motivo.to_string(),
            usuario_email: entry.usuario_email.to_string(),
            created_at: Utc::now(),
        };
        // Mais recente primeiro, como o ORDER BY created_at DESC do repositório
        self.historico.lock().unwrap().insert(0, gravado.clone());
        Ok(gravado)
    }

    async fn history(
        &self,
        nota_id: i64,
        limit: i64,
    ) -> Result<Vec<StatusHistoryEntry>, AppError> {
        Ok(self
            .historico
            .lock()
            .unwrap()
            .iter()
            .filter(|entrada| entrada.nota_id == nota_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn has_history(&self, nota_id: i64) -> Result<bool, AppError> {
        Ok(self
            .historico
            .lock()
            .unwrap()
            .iter()
            .any(|entrada| entrada.nota_id == nota_id))
    }
}

fn service(store: &Arc<MemStore>) -> StatusService<Arc<MemStore>> {
    StatusService::new(store.clone())
}

// REJEIÇÕES ANTES DE QUALQUER ESCRITA

/// "too short" tem 9 caracteres: rejeitado sem tocar o store
#[tokio::test]
async fn rejects_reason_below_ten_chars() {
    let store = Arc::new(MemStore::with_status(DocumentStatus::Alerta));

    let resultado = service(&store)
        .request_transition(
            NOTA,
            DocumentStatus::Alerta,
            DocumentStatus::Aprovado,
            "too short",
            "fiscal@empresa.com.br",
        )
        .await;

    assert!(matches!(resultado, Err(AppError::ReasonTooShort)));
    assert_eq!(store.set_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.status_of(NOTA), Some(DocumentStatus::Alerta));
}

/// O motivo é medido depois do trim
#[tokio::test]
async fn rejects_padded_short_reason() {
    let store = Arc::new(MemStore::with_status(DocumentStatus::Alerta));

    let resultado = service(&store)
        .request_transition(
            NOTA,
            DocumentStatus::Alerta,
            DocumentStatus::Aprovado,
            "   curto    ",
            "fiscal@empresa.com.br",
        )
        .await;

    assert!(matches!(resultado, Err(AppError::ReasonTooShort)));
}

#[tokio::test]
async fn rejects_transition_to_same_status() {
    let store = Arc::new(MemStore::with_status(DocumentStatus::Alerta));

    let resultado = service(&store)
        .request_transition(
            NOTA,
            DocumentStatus::Alerta,
            DocumentStatus::Alerta,
            MOTIVO_OK,
            "fiscal@empresa.com.br",
        )
        .await;

    assert!(matches!(resultado, Err(AppError::SameStatusTransition)));
    assert_eq!(store.set_calls.load(Ordering::SeqCst), 0);
}

/// Sem identidade de operador não há transição
#[tokio::test]
async fn rejects_blank_actor() {
    let store = Arc::new(MemStore::with_status(DocumentStatus::Alerta));

    let resultado = service(&store)
        .request_transition(
            NOTA,
            DocumentStatus::Alerta,
            DocumentStatus::Aprovado,
            MOTIVO_OK,
            "   ",
        )
        .await;

    assert!(matches!(resultado, Err(AppError::InvalidToken)));
    assert_eq!(store.set_calls.load(Ordering::SeqCst), 0);
}

// CAMINHO FELIZ

/// Alerta -> Aprovado: as duas escritas acontecem e o histórico reflete ambas
#[tokio::test]
async fn success_writes_status_and_audit_entry() {
    let store = Arc::new(MemStore::with_status(DocumentStatus::Alerta));
    let servico = service(&store);

    let gravado = servico
        .request_transition(
            NOTA,
            DocumentStatus::Alerta,
            DocumentStatus::Aprovado,
            MOTIVO_OK,
            "fiscal@empresa.com.br",
        )
        .await
        .expect("transição válida");

    assert_eq!(gravado.status_anterior, DocumentStatus::Alerta);
    assert_eq!(gravado.status_novo, DocumentStatus::Aprovado);
    assert_eq!(store.status_of(NOTA), Some(DocumentStatus::Aprovado));

    let historico = servico.history(NOTA, None).await.unwrap();
    assert_eq!(historico.len(), 1);
    assert_eq!(historico[0].status_anterior, DocumentStatus::Alerta);
    assert_eq!(historico[0].status_novo, DocumentStatus::Aprovado);
    assert_eq!(historico[0].usuario_email, "fiscal@empresa.com.br");

    assert!(servico.has_manual_changes(NOTA).await.unwrap());
}

/// O motivo vai para a trilha já sem espaços das pontas
#[tokio::test]
async fn reason_is_stored_trimmed() {
    let store = Arc::new(MemStore::with_status(DocumentStatus::Reprovado));

    let gravado = service(&store)
        .request_transition(
            NOTA,
            DocumentStatus::Reprovado,
            DocumentStatus::Alerta,
            "   Fornecedor regularizou o cadastro.   ",
            "fiscal@empresa.com.br",
        )
        .await
        .expect("transição válida");

    assert_eq!(gravado.motivo, "Fornecedor regularizou o cadastro.");
}

/// Histórico volta do mais recente para o mais antigo e respeita o limite
#[tokio::test]
async fn history_is_newest_first_and_limited() {
    let store = Arc::new(MemStore::with_status(DocumentStatus::Alerta));
    let servico = service(&store);

    servico
        .request_transition(
            NOTA,
            DocumentStatus::Alerta,
            DocumentStatus::Aprovado,
            "Primeira revisão manual concluída.",
            "fiscal@empresa.com.br",
        )
        .await
        .unwrap();
    servico
        .request_transition(
            NOTA,
            DocumentStatus::Aprovado,
            DocumentStatus::Reprovado,
            "Divergência encontrada na segunda conferência.",
            "auditor@empresa.com.br",
        )
        .await
        .unwrap();

    let ultima = servico.history(NOTA, Some(1)).await.unwrap();
    assert_eq!(ultima.len(), 1);
    assert_eq!(ultima[0].status_novo, DocumentStatus::Reprovado);

    let completa = servico.history(NOTA, None).await.unwrap();
    assert_eq!(completa.len(), 2);
    assert_eq!(completa[1].status_novo, DocumentStatus::Aprovado);
}

#[tokio::test]
async fn untouched_document_has_no_manual_changes() {
    let store = Arc::new(MemStore::with_status(DocumentStatus::Alerta));
    assert!(!service(&store).has_manual_changes(NOTA).await.unwrap());
}

// COMPENSAÇÃO

/// Escrita 2 falha, reversão funciona: status volta e o erro diz "revertido"
#[tokio::test]
async fn failed_history_write_reverts_status() {
    let store = Arc::new(MemStore {
        fail_history: true,
        ..MemStore::with_status(DocumentStatus::Alerta)
    });

    let resultado = service(&store)
        .request_transition(
            NOTA,
            DocumentStatus::Alerta,
            DocumentStatus::Aprovado,
            MOTIVO_OK,
            "fiscal@empresa.com.br",
        )
        .await;

    assert!(matches!(resultado, Err(AppError::TransitionReverted(_))));
    // O status voltou ao que era antes da escrita 1
    assert_eq!(store.status_of(NOTA), Some(DocumentStatus::Alerta));
    assert!(store.historico.lock().unwrap().is_empty());
}

/// Escrita 2 E a reversão falham: o chamador recebe o pior caso, distinto
#[tokio::test]
async fn failed_compensation_is_reported_as_inconsistent() {
    let store = Arc::new(MemStore {
        fail_history: true,
        fail_second_set: true,
        ..MemStore::with_status(DocumentStatus::Alerta)
    });

    let resultado = service(&store)
        .request_transition(
            NOTA,
            DocumentStatus::Alerta,
            DocumentStatus::Aprovado,
            MOTIVO_OK,
            "fiscal@empresa.com.br",
        )
        .await;

    match resultado {
        Err(AppError::InconsistentState {
            original,
            compensation,
        }) => {
            assert!(original.contains("histórico"));
            assert!(compensation.contains("reversão"));
        }
        outro => panic!("esperava InconsistentState, veio {outro:?}"),
    }
    // A nota ficou com o status novo e sem registro de auditoria
    assert_eq!(store.status_of(NOTA), Some(DocumentStatus::Aprovado));
}
