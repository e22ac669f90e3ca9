// src/client/memory.rs

use std::cmp::Ordering;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    client::{
        repository::ResourceRepository,
        resource::{Resource, ResourceId},
    },
    common::error::{AppError, AppResult},
    models::{
        envelope::Page,
        query::{ListQuery, SortDirection},
    },
};

/// Repositório em memória com a mesma semântica do backend:
/// busca e filtros sobre o conjunto inteiro, ordenação, paginação,
/// PATCH substituindo os campos enviados e 404 para IDs desconhecidos.
pub struct InMemoryRepository<R: Resource> {
    records: Mutex<Vec<R::Record>>,
    next_id: AtomicI64,
    calls: AtomicUsize,
}

impl<R: Resource> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> InMemoryRepository<R> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            calls: AtomicUsize::new(0),
        }
    }

    /// Popula com registros prontos (os IDs novos continuam depois do maior inteiro).
    pub fn with_records(records: Vec<R::Record>) -> Self {
        let max_id = records
            .iter()
            .filter_map(|r| match R::id(r) {
                ResourceId::Int(id) => Some(id),
                ResourceId::Text(_) => None,
            })
            .max()
            .unwrap_or(0);

        let repo = Self::new();
        repo.next_id.store(max_id + 1, AtomicOrdering::SeqCst);
        *repo.lock() = records;
        repo
    }

    /// Quantas operações (de qualquer tipo) já foram feitas.
    pub fn call_count(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<R::Record> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Aplica uma alteração direta num registro (usado pelas ações de estoque).
    pub fn modify<F>(&self, id: &ResourceId, f: F) -> AppResult<R::Record>
    where
        F: FnOnce(&mut R::Record),
    {
        self.touch();
        let mut records = self.lock();
        let record = records
            .iter_mut()
            .find(|r| &R::id(r) == id)
            .ok_or_else(|| not_found::<R>(id))?;
        f(record);
        Ok(record.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<R::Record>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn touch(&self) {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
    }
}

fn not_found<R: Resource>(id: &ResourceId) -> AppError {
    AppError::Request {
        status: 404,
        message: Some(format!("{} with id {} not found", R::LABEL, id)),
    }
}

// Ordena números como números e o resto como texto
fn compare_columns(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.to_lowercase().cmp(&b.to_lowercase()),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn payload_object<T: serde::Serialize>(payload: &T) -> AppResult<serde_json::Map<String, Value>> {
    match serde_json::to_value(payload)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::MalformedResponse(format!("payload não é objeto: {other}"))),
    }
}

#[async_trait]
impl<R: Resource> ResourceRepository<R> for InMemoryRepository<R> {
    async fn list(&self, query: &ListQuery) -> AppResult<Page<R::Record>> {
        self.touch();
        let mut rows: Vec<R::Record> = self
            .lock()
            .iter()
            .filter(|r| query.search.as_deref().is_none_or(|term| R::matches_search(r, term)))
            .filter(|r| R::matches_filters(r, &query.filters))
            .cloned()
            .collect();

        if let Some(field) = &query.sort_field {
            rows.sort_by(|a, b| {
                let ord = compare_columns(
                    R::column(a, field).as_deref(),
                    R::column(b, field).as_deref(),
                );
                match query.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        let size = query.page_size.max(1);
        let total_elements = rows.len() as u64;
        let total_pages = total_elements.div_ceil(u64::from(size)) as u32;
        let content = rows
            .into_iter()
            .skip(query.page as usize * size as usize)
            .take(size as usize)
            .collect();

        Ok(Page { content, total_elements, total_pages, number: query.page, size })
    }

    async fn get(&self, id: &ResourceId) -> AppResult<R::Record> {
        self.touch();
        self.lock()
            .iter()
            .find(|r| &R::id(r) == id)
            .cloned()
            .ok_or_else(|| not_found::<R>(id))
    }

    async fn create(&self, payload: &R::Payload) -> AppResult<R::Record> {
        self.touch();
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);

        let mut object = payload_object(payload)?;
        object.insert("id".to_string(), Value::from(id));
        let record: R::Record = serde_json::from_value(Value::Object(object))?;

        self.lock().push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &ResourceId, payload: &R::Payload) -> AppResult<R::Record> {
        self.touch();
        let changes = payload_object(payload)?;

        let mut records = self.lock();
        let slot = records
            .iter_mut()
            .find(|r| &R::id(r) == id)
            .ok_or_else(|| not_found::<R>(id))?;

        // PATCH: os campos enviados substituem os atuais; o ID nunca muda
        let mut current = payload_object(&*slot)?;
        for (key, value) in changes {
            if key != "id" {
                current.insert(key, value);
            }
        }
        let updated: R::Record = serde_json::from_value(Value::Object(current))?;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn remove(&self, id: &ResourceId) -> AppResult<()> {
        self.touch();
        let mut records = self.lock();
        let before = records.len();
        records.retain(|r| &R::id(r) != id);
        if records.len() == before {
            return Err(not_found::<R>(id));
        }
        Ok(())
    }
}
