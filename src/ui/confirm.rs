// src/ui/confirm.rs

use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

use crate::{
    client::{
        repository::ResourceRepository,
        resource::{Resource, ResourceId},
    },
    common::{error::AppError, notification::Notifier},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmState {
    Closed,
    Open { id: ResourceId, name: String },
    Deleting { id: ResourceId, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(ResourceId),
    Failed(String),
    /// Sem diálogo aberto, ou já havia uma exclusão em andamento.
    Ignored,
    Cancelled,
}

/// Texto exibido no diálogo de confirmação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
}

/// Portão de exclusão: nenhum DELETE sai sem confirmação explícita.
pub struct ConfirmGate<R: Resource> {
    repo: Arc<dyn ResourceRepository<R>>,
    notifier: Notifier,
    cancel: CancellationToken,
    state: Mutex<ConfirmState>,
}

impl<R: Resource> ConfirmGate<R> {
    pub fn new(
        repo: Arc<dyn ResourceRepository<R>>,
        notifier: Notifier,
        cancel: CancellationToken,
    ) -> Self {
        Self { repo, notifier, cancel, state: Mutex::new(ConfirmState::Closed) }
    }

    pub fn state(&self) -> ConfirmState {
        self.lock().clone()
    }

    /// Clique em "Excluir" na linha: só abre o diálogo.
    pub fn request(&self, record: &R::Record) -> Option<ConfirmPrompt> {
        let mut state = self.lock();
        if matches!(*state, ConfirmState::Deleting { .. }) {
            return None;
        }
        let name = R::display_name(record);
        let prompt = ConfirmPrompt {
            title: format!("Delete {}", R::LABEL),
            message: format!("Are you sure you want to delete \"{name}\"? This action cannot be undone."),
        };
        *state = ConfirmState::Open { id: R::id(record), name };
        Some(prompt)
    }

    pub fn can_confirm(&self) -> bool {
        matches!(*self.lock(), ConfirmState::Open { .. })
    }

    pub fn can_cancel(&self) -> bool {
        matches!(*self.lock(), ConfirmState::Open { .. })
    }

    /// Fecha sem excluir. Desabilitado enquanto o DELETE está em andamento.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock();
        match *state {
            ConfirmState::Open { .. } => {
                *state = ConfirmState::Closed;
                true
            }
            _ => false,
        }
    }

    /// Envia o DELETE. O diálogo fecha em qualquer resultado.
    pub async fn confirm(&self) -> DeleteOutcome {
        let id = {
            let mut state = self.lock();
            let ConfirmState::Open { id, name } = state.clone() else {
                return DeleteOutcome::Ignored;
            };
            *state = ConfirmState::Deleting { id: id.clone(), name };
            id
        };

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AppError::Cancelled),
            result = self.repo.remove(&id) => result,
        };

        *self.lock() = ConfirmState::Closed;

        match result {
            Ok(()) => {
                self.notifier.success(format!("{} deleted successfully", R::LABEL));
                DeleteOutcome::Deleted(id)
            }
            Err(AppError::Cancelled) => DeleteOutcome::Cancelled,
            Err(e) => {
                tracing::warn!(recurso = R::PATH, %id, "exclusão falhou: {}", e);
                let fallback = format!("Failed to delete {}", R::LABEL.to_lowercase());
                let message = e.user_message(&fallback);
                self.notifier.error(message.clone());
                DeleteOutcome::Failed(message)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConfirmState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::memory::InMemoryRepository,
        models::crm::{Territories, Territory},
    };
    use serde_json::json;

    fn territory(id: i64) -> Territory {
        serde_json::from_value(json!({ "id": id, "territoryName": format!("T{id}") })).unwrap()
    }

    #[tokio::test]
    async fn request_alone_never_deletes() {
        let repo = Arc::new(InMemoryRepository::<Territories>::with_records(vec![territory(1)]));
        let gate = ConfirmGate::<Territories>::new(repo.clone(), Notifier::new(), CancellationToken::new());

        let prompt = gate.request(&territory(1)).unwrap();
        assert!(prompt.message.contains("T1"));
        assert!(gate.cancel());

        assert_eq!(repo.call_count(), 0);
        assert_eq!(gate.state(), ConfirmState::Closed);
        assert!(matches!(gate.confirm().await, DeleteOutcome::Ignored));
    }

    #[tokio::test]
    async fn confirm_deletes_and_toasts() {
        let repo = Arc::new(InMemoryRepository::<Territories>::with_records(vec![territory(1)]));
        let notifier = Notifier::new();
        let gate = ConfirmGate::<Territories>::new(repo.clone(), notifier.clone(), CancellationToken::new());

        gate.request(&territory(1));
        assert_eq!(gate.confirm().await, DeleteOutcome::Deleted(ResourceId::Int(1)));
        assert!(repo.is_empty());
        assert_eq!(notifier.last().unwrap().message, "Territory deleted successfully");
        assert_eq!(gate.state(), ConfirmState::Closed);
    }

    #[tokio::test]
    async fn failed_delete_still_closes_dialog() {
        let repo = Arc::new(InMemoryRepository::<Territories>::new());
        let notifier = Notifier::new();
        let gate = ConfirmGate::<Territories>::new(repo, notifier.clone(), CancellationToken::new());

        gate.request(&territory(9));
        assert!(matches!(gate.confirm().await, DeleteOutcome::Failed(ref m) if m == "Territory with id 9 not found"));
        assert_eq!(gate.state(), ConfirmState::Closed);
        assert_eq!(notifier.snapshot().len(), 1);
    }
}
