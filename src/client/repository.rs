// src/client/repository.rs

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::{
    client::{
        http::ResourceClient,
        resource::{Resource, ResourceId},
    },
    common::error::AppResult,
    models::{envelope::Page, query::ListQuery},
};

/// Acesso aos dados de um recurso, injetado em cada tela.
///
/// Em produção é o [`HttpRepository`]; nos testes, o
/// [`InMemoryRepository`](crate::client::memory::InMemoryRepository) ou um falso.
#[async_trait]
pub trait ResourceRepository<R: Resource>: Send + Sync {
    async fn list(&self, query: &ListQuery) -> AppResult<Page<R::Record>>;

    async fn get(&self, id: &ResourceId) -> AppResult<R::Record>;

    async fn create(&self, payload: &R::Payload) -> AppResult<R::Record>;

    async fn update(&self, id: &ResourceId, payload: &R::Payload) -> AppResult<R::Record>;

    async fn remove(&self, id: &ResourceId) -> AppResult<()>;
}

// O repositório HTTP: só repassa para o ResourceClient com o tipo certo
pub struct HttpRepository<R> {
    client: ResourceClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpRepository<R> {
    pub fn new(client: ResourceClient) -> Self {
        Self { client, _resource: PhantomData }
    }
}

impl<R> Clone for HttpRepository<R> {
    fn clone(&self) -> Self {
        Self { client: self.client.clone(), _resource: PhantomData }
    }
}

#[async_trait]
impl<R: Resource> ResourceRepository<R> for HttpRepository<R> {
    async fn list(&self, query: &ListQuery) -> AppResult<Page<R::Record>> {
        self.client.list::<R>(query).await
    }

    async fn get(&self, id: &ResourceId) -> AppResult<R::Record> {
        self.client.get::<R>(id).await
    }

    async fn create(&self, payload: &R::Payload) -> AppResult<R::Record> {
        self.client.create::<R>(payload).await
    }

    async fn update(&self, id: &ResourceId, payload: &R::Payload) -> AppResult<R::Record> {
        self.client.update::<R>(id, payload).await
    }

    async fn remove(&self, id: &ResourceId) -> AppResult<()> {
        self.client.remove::<R>(id).await
    }
}
