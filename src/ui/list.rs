// src/ui/list.rs

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

use crate::{
    client::{repository::ResourceRepository, resource::Resource},
    common::{error::AppError, notification::Notifier},
    config::ClientConfig,
    models::query::{FilterMode, ListQuery, SortDirection},
};

// --- ESTADO DA LISTA ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    pub page: u32,
    pub page_size: u32,
    pub sort_field: Option<String>,
    pub direction: SortDirection,
    pub search_term: String,
    pub filters: BTreeMap<String, String>,
}

impl ListState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 0,
            page_size,
            sort_field: None,
            direction: SortDirection::Asc,
            search_term: String::new(),
            filters: BTreeMap::new(),
        }
    }

    pub fn to_query(&self) -> ListQuery {
        let search = Some(self.search_term.trim().to_string()).filter(|s| !s.is_empty());
        ListQuery {
            page: self.page,
            page_size: self.page_size,
            sort_field: self.sort_field.clone(),
            direction: self.direction,
            search,
            filters: self.filters.clone(),
        }
    }
}

/// O que a tabela desenha.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    pub rows: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub loading: bool,
    pub error: Option<String>,
    empty_message: String,
}

impl<T> ListView<T> {
    fn new(plural: &str, page_size: u32) -> Self {
        Self {
            rows: Vec::new(),
            page: 0,
            page_size,
            total_elements: 0,
            total_pages: 0,
            loading: false,
            error: None,
            empty_message: format!("No {plural} found"),
        }
    }

    /// "Anterior" fica desabilitado na página 0.
    pub fn can_go_previous(&self) -> bool {
        self.page > 0
    }

    /// "Próxima" fica desabilitado quando `page + 1 >= totalPages`.
    pub fn can_go_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    /// Linha única "No ... found" no lugar de uma tabela vazia.
    pub fn empty_row(&self) -> Option<&str> {
        (!self.loading && self.rows.is_empty()).then_some(self.empty_message.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// Uma requisição mais nova já foi disparada; esta resposta foi descartada.
    Stale,
    Cancelled,
    Failed(String),
}

struct ListInner<T> {
    state: ListState,
    view: ListView<T>,
    latest_request: u64,
}

// =============================================================================
//  CONTROLADOR
// =============================================================================

/// Guarda página, ordenação, busca e filtros, e recalcula as linhas
/// visíveis sempre que algum deles muda.
///
/// Qualquer mudança de busca, filtro, ordenação ou tamanho de página volta
/// para a página 0. Só a resposta da requisição mais recente é aplicada.
pub struct ListController<R: Resource> {
    repo: Arc<dyn ResourceRepository<R>>,
    mode: FilterMode,
    notifier: Notifier,
    cancel: CancellationToken,
    inner: Mutex<ListInner<R::Record>>,
}

impl<R: Resource> ListController<R> {
    pub fn new(
        repo: Arc<dyn ResourceRepository<R>>,
        config: &ClientConfig,
        notifier: Notifier,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            repo,
            mode: config.filter_mode,
            notifier,
            cancel,
            inner: Mutex::new(ListInner {
                state: ListState::new(config.page_size),
                view: ListView::new(R::PLURAL, config.page_size),
                latest_request: 0,
            }),
        }
    }

    pub fn state(&self) -> ListState {
        self.lock().state.clone()
    }

    pub fn view(&self) -> ListView<R::Record> {
        self.lock().view.clone()
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.mode
    }

    /// Busca a página atual e aplica a resposta, se ainda for a mais recente.
    pub async fn refresh(&self) -> RefreshOutcome {
        let outcome = self.fetch_current().await;

        // Apagar a última linha da última página deixa a página vazia: volta uma
        let step_back = {
            let mut inner = self.lock();
            let total_pages = inner.view.total_pages;
            if outcome == RefreshOutcome::Applied && total_pages > 0 && inner.state.page >= total_pages {
                inner.state.page = total_pages - 1;
                true
            } else {
                false
            }
        };

        if step_back {
            return self.fetch_current().await;
        }
        outcome
    }

    async fn fetch_current(&self) -> RefreshOutcome {
        let (request_id, query) = {
            let mut inner = self.lock();
            inner.latest_request += 1;
            inner.view.loading = true;

            let mut query = inner.state.to_query();
            if self.mode == FilterMode::PageLocal {
                // Busca e filtros ficam no cliente, aplicados depois da resposta
                query.search = None;
                query.filters.clear();
            }
            (inner.latest_request, query)
        };

        tracing::debug!(recurso = R::PATH, consulta = %query, "buscando página");

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AppError::Cancelled),
            result = self.repo.list(&query) => result,
        };

        let mut inner = self.lock();
        if request_id != inner.latest_request {
            tracing::debug!(recurso = R::PATH, request_id, "resposta antiga descartada");
            return RefreshOutcome::Stale;
        }
        inner.view.loading = false;

        match result {
            Ok(page) => {
                let rows = match self.mode {
                    FilterMode::Server => page.content,
                    // Filtra só o que veio nesta página
                    FilterMode::PageLocal => {
                        let term = inner.state.search_term.clone();
                        let filters = inner.state.filters.clone();
                        page.content
                            .into_iter()
                            .filter(|r| R::matches_search(r, &term) && R::matches_filters(r, &filters))
                            .collect()
                    }
                };

                let view = &mut inner.view;
                view.rows = rows;
                view.page = query.page;
                view.page_size = query.page_size;
                view.total_elements = page.total_elements;
                view.total_pages = page.total_pages;
                view.error = None;
                RefreshOutcome::Applied
            }
            Err(AppError::Cancelled) => {
                tracing::debug!(recurso = R::PATH, "listagem cancelada");
                RefreshOutcome::Cancelled
            }
            Err(e) => {
                // Erro nunca derruba a tela: lista vazia + toast
                let message = e.user_message(&format!("Failed to load {}", R::PLURAL));
                tracing::error!(recurso = R::PATH, "falha ao listar: {}", e);

                let view = &mut inner.view;
                view.rows.clear();
                view.total_elements = 0;
                view.total_pages = 0;
                view.page = query.page;
                view.error = Some(message.clone());
                drop(inner);

                self.notifier.error(message.clone());
                RefreshOutcome::Failed(message)
            }
        }
    }

    // =========================================================================
    //  MUDANÇAS DE ESTADO (todas voltam para a página 0)
    // =========================================================================

    pub async fn set_search(&self, term: impl Into<String>) -> RefreshOutcome {
        let term = term.into();
        self.reset_and_refresh(|state| state.search_term = term).await
    }

    pub async fn set_filter(&self, column: impl Into<String>, value: impl Into<String>) -> RefreshOutcome {
        let (column, value) = (column.into(), value.into());
        self.reset_and_refresh(|state| {
            if value.trim().is_empty() {
                state.filters.remove(&column);
            } else {
                state.filters.insert(column, value);
            }
        })
        .await
    }

    pub async fn clear_filters(&self) -> RefreshOutcome {
        self.reset_and_refresh(|state| {
            state.filters.clear();
            state.search_term.clear();
        })
        .await
    }

    pub async fn set_page_size(&self, page_size: u32) -> RefreshOutcome {
        let page_size = page_size.max(1);
        self.reset_and_refresh(|state| state.page_size = page_size).await
    }

    /// Mesmo campo inverte a direção; campo novo começa ascendente.
    pub async fn toggle_sort(&self, field: impl Into<String>) -> RefreshOutcome {
        let field = field.into();
        self.reset_and_refresh(|state| {
            if state.sort_field.as_deref() == Some(field.as_str()) {
                state.direction = state.direction.flipped();
            } else {
                state.sort_field = Some(field);
                state.direction = SortDirection::Asc;
            }
        })
        .await
    }

    async fn reset_and_refresh<F>(&self, change: F) -> RefreshOutcome
    where
        F: FnOnce(&mut ListState),
    {
        {
            let mut inner = self.lock();
            change(&mut inner.state);
            inner.state.page = 0;
        }
        self.refresh().await
    }

    // =========================================================================
    //  NAVEGAÇÃO
    // =========================================================================

    /// `None` quando o botão estaria desabilitado (nenhuma requisição sai).
    pub async fn next_page(&self) -> Option<RefreshOutcome> {
        {
            let mut inner = self.lock();
            if !inner.view.can_go_next() {
                return None;
            }
            inner.state.page = inner.view.page + 1;
        }
        Some(self.refresh().await)
    }

    pub async fn previous_page(&self) -> Option<RefreshOutcome> {
        {
            let mut inner = self.lock();
            if !inner.view.can_go_previous() {
                return None;
            }
            inner.state.page = inner.view.page - 1;
        }
        Some(self.refresh().await)
    }

    /// Vai para a página pedida, limitada ao intervalo conhecido.
    pub async fn go_to_page(&self, page: u32) -> RefreshOutcome {
        {
            let mut inner = self.lock();
            let last = inner.view.total_pages.saturating_sub(1);
            inner.state.page = page.min(last);
        }
        self.refresh().await
    }

    fn lock(&self) -> MutexGuard<'_, ListInner<R::Record>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
