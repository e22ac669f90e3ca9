// src/ui/screen.rs

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    client::{
        repository::{HttpRepository, ResourceRepository},
        resource::{Resource, ResourceId},
    },
    common::{
        error::{AppError, AppResult},
        notification::Notifier,
    },
    config::{AppState, ClientConfig},
    ui::{
        confirm::{ConfirmGate, ConfirmPrompt, DeleteOutcome},
        list::{ListController, RefreshOutcome},
        mutation::{FormDialog, SubmitOutcome},
    },
};

/// Uma tela de gestão: lista + diálogo de criar/editar + confirmação de exclusão.
///
/// Todas as partes compartilham o mesmo repositório e a mesma fila de toasts.
/// Fechar a tela (ou soltá-la) cancela o que ainda estiver em andamento, e
/// nenhuma resposta que chegue depois altera o estado.
pub struct ManagementScreen<R: Resource> {
    repo: Arc<dyn ResourceRepository<R>>,
    list: ListController<R>,
    form: FormDialog<R>,
    gate: ConfirmGate<R>,
    notifier: Notifier,
    cancel: CancellationToken,
}

impl<R: Resource> ManagementScreen<R> {
    pub fn new(repo: Arc<dyn ResourceRepository<R>>, config: &ClientConfig, notifier: Notifier) -> Self {
        let cancel = CancellationToken::new();
        Self {
            list: ListController::new(repo.clone(), config, notifier.clone(), cancel.child_token()),
            form: FormDialog::new(repo.clone(), notifier.clone(), cancel.child_token()),
            gate: ConfirmGate::new(repo.clone(), notifier.clone(), cancel.child_token()),
            repo,
            notifier,
            cancel,
        }
    }

    /// Tela ligada ao backend HTTP do `AppState`.
    pub fn from_state(state: &AppState) -> Self {
        let repo: Arc<dyn ResourceRepository<R>> = Arc::new(HttpRepository::<R>::new(state.client.clone()));
        Self::new(repo, &state.config, state.notifier.clone())
    }

    pub fn list(&self) -> &ListController<R> {
        &self.list
    }

    pub fn form(&self) -> &FormDialog<R> {
        &self.form
    }

    pub fn gate(&self) -> &ConfirmGate<R> {
        &self.gate
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Carga inicial ao abrir a tela.
    pub async fn open(&self) -> RefreshOutcome {
        tracing::info!(recurso = R::PATH, "tela aberta");
        self.list.refresh().await
    }

    /// Envia o formulário; depois de salvar, recarrega a lista.
    pub async fn submit_form(&self) -> SubmitOutcome<R::Record> {
        let outcome = self.form.submit().await;
        if outcome.is_saved() {
            self.list.refresh().await;
        }
        outcome
    }

    /// Abre a edição buscando o registro atualizado no backend.
    pub async fn open_edit_by_id(&self, id: &ResourceId) -> AppResult<bool> {
        let record = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(AppError::Cancelled),
            record = self.repo.get(id) => record,
        };

        match record {
            Ok(record) => self.form.open_edit(&record),
            Err(e) => {
                let fallback = format!("Failed to load {}", R::LABEL.to_lowercase());
                self.notifier.error(e.user_message(&fallback));
                Err(e)
            }
        }
    }

    pub fn request_delete(&self, record: &R::Record) -> Option<ConfirmPrompt> {
        self.gate.request(record)
    }

    /// Confirma a exclusão pendente; se apagou, recarrega a lista.
    pub async fn confirm_delete(&self) -> DeleteOutcome {
        let outcome = self.gate.confirm().await;
        if matches!(outcome, DeleteOutcome::Deleted(_)) {
            self.list.refresh().await;
        }
        outcome
    }

    /// Token para diálogos extras da tela; cancelado junto com ela.
    pub fn child_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Sai da tela: cancela listagens, envios e exclusões pendentes.
    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!(recurso = R::PATH, "tela fechada");
            self.cancel.cancel();
        }
    }
}

impl<R: Resource> Drop for ManagementScreen<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
