// src/ui/mutation.rs

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::{
    client::{
        repository::ResourceRepository,
        resource::{Resource, ResourceId},
    },
    common::{
        error::{AppError, AppResult},
        notification::Notifier,
    },
    validation::{validate_form, CrossFieldRules, FieldErrors},
};

// --- ESTADOS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    Editing,
    Validating,
    Submitting,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    Saved(T),
    /// Validação falhou; nenhuma requisição saiu.
    Invalid(FieldErrors),
    /// O backend (ou a rede) recusou; o texto é o do toast.
    Failed(String),
    /// Já havia um envio em andamento (ou o formulário não estava aberto).
    Ignored,
    Cancelled,
}

impl<T> SubmitOutcome<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Saved(_))
    }
}

/// Textos dos toasts de uma operação.
#[derive(Debug, Clone)]
pub struct MutationMessages {
    pub success: String,
    pub failure: String,
}

impl MutationMessages {
    pub fn new(success: impl Into<String>, failure: impl Into<String>) -> Self {
        Self { success: success.into(), failure: failure.into() }
    }

    pub fn created(label: &str) -> Self {
        Self::new(
            format!("{label} created successfully"),
            format!("Failed to create {}", label.to_lowercase()),
        )
    }

    pub fn updated(label: &str) -> Self {
        Self::new(
            format!("{label} updated successfully"),
            format!("Failed to update {}", label.to_lowercase()),
        )
    }
}

// =============================================================================
//  FLUXO DE MUTAÇÃO
// =============================================================================

/// Máquina de estados do submit:
/// Editing -> Validating -> Submitting -> Success | Failed.
///
/// Enquanto está em `Submitting`, novos submits são ignorados (botão
/// desabilitado), então cada clique válido gera no máximo uma requisição.
pub struct MutationFlow {
    state: Mutex<MutationState>,
    notifier: Notifier,
    cancel: CancellationToken,
}

impl MutationFlow {
    pub fn new(notifier: Notifier, cancel: CancellationToken) -> Self {
        Self { state: Mutex::new(MutationState::Idle), notifier, cancel }
    }

    pub fn state(&self) -> MutationState {
        *self.lock()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state(), MutationState::Validating | MutationState::Submitting)
    }

    /// Abre o formulário (Idle/Success/Failed -> Editing).
    pub fn begin_editing(&self) -> bool {
        let mut state = self.lock();
        if matches!(*state, MutationState::Validating | MutationState::Submitting) {
            return false;
        }
        *state = MutationState::Editing;
        true
    }

    /// Fecha sem enviar. Não faz nada com um envio em andamento.
    pub fn reset(&self) -> bool {
        let mut state = self.lock();
        if matches!(*state, MutationState::Validating | MutationState::Submitting) {
            return false;
        }
        *state = MutationState::Idle;
        true
    }

    /// Valida, envia com `op`, mostra o toast e registra o resultado.
    pub async fn submit<P, T, F, Fut>(
        &self,
        payload: &P,
        messages: &MutationMessages,
        op: F,
    ) -> SubmitOutcome<T>
    where
        P: Validate + CrossFieldRules,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        {
            let mut state = self.lock();
            // Failed continua em edição: o usuário pode corrigir e tentar de novo
            if !matches!(*state, MutationState::Editing | MutationState::Failed) {
                tracing::debug!(estado = ?*state, "submit ignorado");
                return SubmitOutcome::Ignored;
            }
            *state = MutationState::Validating;
        }

        if let Err(err) = validate_form(payload) {
            *self.lock() = MutationState::Editing;
            return match err {
                AppError::Validation(fields) => SubmitOutcome::Invalid(fields),
                other => SubmitOutcome::Failed(other.user_message(&messages.failure)),
            };
        }

        *self.lock() = MutationState::Submitting;

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AppError::Cancelled),
            result = op() => result,
        };

        match result {
            Ok(value) => {
                *self.lock() = MutationState::Success;
                self.notifier.success(messages.success.clone());
                SubmitOutcome::Saved(value)
            }
            Err(AppError::Cancelled) => {
                *self.lock() = MutationState::Idle;
                tracing::debug!("envio cancelado; a tela foi fechada");
                SubmitOutcome::Cancelled
            }
            Err(e) => {
                *self.lock() = MutationState::Failed;
                tracing::warn!("envio falhou: {}", e);
                let message = e.user_message(&messages.failure);
                self.notifier.error(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, MutationState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// =============================================================================
//  DIÁLOGO DE FORMULÁRIO (criar / editar)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogMode {
    Closed,
    Create,
    Edit(ResourceId),
}

struct FormInner<P> {
    mode: DialogMode,
    draft: P,
    errors: FieldErrors,
}

/// Diálogo de criar/editar um recurso. O rascunho só existe enquanto o
/// diálogo está aberto; cancelar descarta tudo.
pub struct FormDialog<R: Resource> {
    repo: Arc<dyn ResourceRepository<R>>,
    flow: MutationFlow,
    inner: Mutex<FormInner<R::Payload>>,
}

impl<R: Resource> FormDialog<R> {
    pub fn new(
        repo: Arc<dyn ResourceRepository<R>>,
        notifier: Notifier,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            repo,
            flow: MutationFlow::new(notifier, cancel),
            inner: Mutex::new(FormInner {
                mode: DialogMode::Closed,
                draft: R::Payload::default(),
                errors: FieldErrors::new(),
            }),
        }
    }

    pub fn open_create(&self) -> bool {
        self.open(DialogMode::Create, R::Payload::default())
    }

    /// Abre a edição com os valores atuais do registro.
    pub fn open_edit(&self, record: &R::Record) -> AppResult<bool> {
        let draft = R::to_payload(record)?;
        Ok(self.open(DialogMode::Edit(R::id(record)), draft))
    }

    fn open(&self, mode: DialogMode, draft: R::Payload) -> bool {
        if !self.flow.begin_editing() {
            return false;
        }
        let mut inner = self.lock();
        inner.mode = mode;
        inner.draft = draft;
        inner.errors = FieldErrors::new();
        true
    }

    /// Altera o rascunho (digitação do usuário).
    pub fn edit<F>(&self, change: F)
    where
        F: FnOnce(&mut R::Payload),
    {
        let mut inner = self.lock();
        if inner.mode != DialogMode::Closed {
            change(&mut inner.draft);
        }
    }

    pub fn draft(&self) -> R::Payload {
        self.lock().draft.clone()
    }

    pub fn errors(&self) -> FieldErrors {
        self.lock().errors.clone()
    }

    pub fn mode(&self) -> DialogMode {
        self.lock().mode.clone()
    }

    pub fn is_open(&self) -> bool {
        self.mode() != DialogMode::Closed
    }

    pub fn state(&self) -> MutationState {
        self.flow.state()
    }

    /// O botão de enviar fica desabilitado enquanto isto for `true`.
    pub fn is_submitting(&self) -> bool {
        self.flow.is_submitting()
    }

    /// Cancelar: descarta o rascunho. Desabilitado durante o envio.
    pub fn cancel(&self) -> bool {
        if !self.flow.reset() {
            return false;
        }
        self.close();
        true
    }

    /// POST (criar) ou PATCH (editar). No sucesso o diálogo fecha e o
    /// formulário volta ao padrão; na falha fica aberto com os valores.
    pub async fn submit(&self) -> SubmitOutcome<R::Record> {
        let (mode, draft) = {
            let inner = self.lock();
            (inner.mode.clone(), inner.draft.clone())
        };

        let outcome = match &mode {
            DialogMode::Closed => return SubmitOutcome::Ignored,
            DialogMode::Create => {
                let messages = MutationMessages::created(R::LABEL);
                self.flow.submit(&draft, &messages, || self.repo.create(&draft)).await
            }
            DialogMode::Edit(id) => {
                let messages = MutationMessages::updated(R::LABEL);
                self.flow.submit(&draft, &messages, || self.repo.update(id, &draft)).await
            }
        };

        match &outcome {
            SubmitOutcome::Saved(_) => {
                self.close();
                self.flow.reset();
            }
            SubmitOutcome::Invalid(fields) => {
                self.lock().errors = fields.clone();
            }
            SubmitOutcome::Failed(_) => {
                self.lock().errors = FieldErrors::new();
            }
            SubmitOutcome::Ignored | SubmitOutcome::Cancelled => {}
        }
        outcome
    }

    fn close(&self) {
        let mut inner = self.lock();
        inner.mode = DialogMode::Closed;
        inner.draft = R::Payload::default();
        inner.errors = FieldErrors::new();
    }

    fn lock(&self) -> MutexGuard<'_, FormInner<R::Payload>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::memory::InMemoryRepository,
        models::crm::{Leads, LeadPayload},
    };

    fn dialog(repo: Arc<InMemoryRepository<Leads>>, notifier: Notifier) -> FormDialog<Leads> {
        FormDialog::<Leads>::new(repo, notifier, CancellationToken::new())
    }

    #[tokio::test]
    async fn invalid_form_issues_no_request() {
        let repo = Arc::new(InMemoryRepository::<Leads>::new());
        let form = dialog(repo.clone(), Notifier::new());
        form.open_create();

        let outcome = form.submit().await;
        assert!(matches!(outcome, SubmitOutcome::Invalid(ref f) if f.contains("firstName") && f.contains("lastName")));
        assert_eq!(repo.call_count(), 0);
        assert_eq!(form.state(), MutationState::Editing);
        assert!(form.errors().contains("firstName"));
    }

    #[tokio::test]
    async fn success_closes_and_resets_the_form() {
        let repo = Arc::new(InMemoryRepository::<Leads>::new());
        let notifier = Notifier::new();
        let form = dialog(repo.clone(), notifier.clone());
        form.open_create();
        form.edit(|d| {
            d.first_name = "Ana".into();
            d.last_name = "Souza".into();
        });

        assert!(form.submit().await.is_saved());
        assert!(!form.is_open());
        assert_eq!(form.draft().first_name, "");
        assert_eq!(notifier.last().unwrap().message, "Lead created successfully");
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn failure_keeps_dialog_open_with_values() {
        let repo = Arc::new(InMemoryRepository::<Leads>::new());
        let notifier = Notifier::new();
        let form = dialog(repo.clone(), notifier.clone());

        let ghost: crate::models::crm::Lead = serde_json::from_value(serde_json::json!({
            "id": 77, "firstName": "Ghost", "lastName": "Lead"
        }))
        .unwrap();
        form.open_edit(&ghost).unwrap();
        form.edit(|d| d.company = Some("Nowhere".into()));

        let outcome = form.submit().await;
        assert!(matches!(outcome, SubmitOutcome::Failed(ref m) if m == "Lead with id 77 not found"));
        assert!(form.is_open());
        assert_eq!(form.state(), MutationState::Failed);
        assert_eq!(form.draft().company.as_deref(), Some("Nowhere"));
        assert_eq!(form.mode(), DialogMode::Edit(ResourceId::Int(77)));
    }

    #[tokio::test]
    async fn closed_dialog_ignores_submit() {
        let repo = Arc::new(InMemoryRepository::<Leads>::new());
        let form = dialog(repo.clone(), Notifier::new());
        form.edit(|d: &mut LeadPayload| d.first_name = "x".into());
        assert!(matches!(form.submit().await, SubmitOutcome::Ignored));
        assert_eq!(repo.call_count(), 0);
    }

    #[tokio::test]
    async fn flow_ignores_submit_when_not_editing() {
        let flow = MutationFlow::new(Notifier::new(), CancellationToken::new());
        let outcome: SubmitOutcome<()> = flow
            .submit(&LeadPayload::default(), &MutationMessages::created("Lead"), || async { Ok(()) })
            .await;
        assert!(matches!(outcome, SubmitOutcome::Ignored));
    }
}
