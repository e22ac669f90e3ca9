//! Cliente REST do backend do CRM.
//!
//! Todas as respostas chegam no envelope padrão
//! `{success, message, data, statusCode, timestamp}`; este módulo
//! converte status HTTP, `success: false`, falhas de rede e envelopes
//! malformados em [`AppError`].

use std::sync::Arc;

use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    client::resource::{Resource, ResourceId},
    common::error::{AppError, AppResult},
    config::ClientConfig,
    models::{
        envelope::{self, Page},
        query::ListQuery,
    },
};

/// Cliente HTTP fino sobre `reqwest`, sem retry e sem timeout próprio.
#[derive(Clone)]
pub struct ResourceClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl ResourceClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), Arc::new(config))
    }

    /// Reaproveita um [`reqwest::Client`] existente (pool de conexões).
    pub fn with_client(http: reqwest::Client, config: Arc<ClientConfig>) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // =========================================================================
    //  OPERAÇÕES CRUD
    // =========================================================================

    /// `GET /{recurso}?pageNumber=..&pageSize=..` (ou `page`/`size`, conforme a config).
    pub async fn list<R: Resource>(&self, query: &ListQuery) -> AppResult<Page<R::Record>> {
        let url = self.endpoint(&[R::PATH])?;
        let params = query.to_params(self.config.pagination_style, self.config.filter_mode);

        let request = self.http.get(url).query(&params);
        let (status, body) = self.send(Method::GET, R::PATH, request).await?;
        let body = body.ok_or_else(|| AppError::MalformedResponse("listagem sem corpo".into()))?;

        envelope::unwrap_data(status, body)
    }

    /// `GET /{recurso}/{id}`
    pub async fn get<R: Resource>(&self, id: &ResourceId) -> AppResult<R::Record> {
        let id = id.to_string();
        let url = self.endpoint(&[R::PATH, &id])?;
        self.expect_data(Method::GET, R::PATH, self.http.get(url)).await
    }

    /// `POST /{recurso}`
    pub async fn create<R: Resource>(&self, payload: &R::Payload) -> AppResult<R::Record> {
        let url = self.endpoint(&[R::PATH])?;
        self.expect_data(Method::POST, R::PATH, self.http.post(url).json(payload)).await
    }

    /// `PATCH /{recurso}/{id}` com o payload inteiro.
    pub async fn update<R: Resource>(
        &self,
        id: &ResourceId,
        payload: &R::Payload,
    ) -> AppResult<R::Record> {
        let id = id.to_string();
        let url = self.endpoint(&[R::PATH, &id])?;
        self.expect_data(Method::PATCH, R::PATH, self.http.patch(url).json(payload)).await
    }

    /// `DELETE /{recurso}/{id}`
    pub async fn remove<R: Resource>(&self, id: &ResourceId) -> AppResult<()> {
        let id = id.to_string();
        let url = self.endpoint(&[R::PATH, &id])?;
        let (status, body) = self.send(Method::DELETE, R::PATH, self.http.delete(url)).await?;
        envelope::check_success(status, body)
    }

    /// `POST` numa sub-rota de ação (ex: `/items/{id}/adjustments`).
    pub async fn post_action<B, T>(&self, segments: &[&str], body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        let label = segments.join("/");
        self.expect_data(Method::POST, &label, self.http.post(url).json(body)).await
    }

    // ---- helpers privados ----

    /// Monta `base_url + api_prefix + segmentos`, codificando cada segmento.
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| AppError::Config(format!("base URL inválida '{}': {e}", self.config.base_url)))?;

        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| AppError::Config(format!("base URL sem caminho: '{}'", self.config.base_url)))?;
            path.pop_if_empty();
            for prefix in self.config.api_prefix.split('/').filter(|s| !s.is_empty()) {
                path.push(prefix);
            }
            for segment in segments {
                path.push(segment);
            }
        }

        Ok(url)
    }

    async fn expect_data<T: DeserializeOwned>(
        &self,
        method: Method,
        label: &str,
        request: reqwest::RequestBuilder,
    ) -> AppResult<T> {
        let (status, body) = self.send(method, label, request).await?;
        let body = body.ok_or_else(|| AppError::MalformedResponse("resposta sem corpo".into()))?;
        envelope::unwrap_data(status, body)
    }

    /// Envia a requisição e devolve status + corpo JSON (se houver).
    /// Status fora de 2xx vira `AppError::Request` com a mensagem do envelope.
    async fn send(
        &self,
        method: Method,
        label: &str,
        request: reqwest::RequestBuilder,
    ) -> AppResult<(u16, Option<Value>)> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(%method, recurso = label, "falha de rede: {}", e);
            AppError::Network(e.to_string())
        })?;

        let status = response.status();
        let text = response.text().await?;

        let body = if text.trim().is_empty() {
            None
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => Some(value),
                // Corpo não-JSON num erro: ainda é erro de requisição, só sem mensagem
                Err(_) if !status.is_success() => None,
                Err(e) => {
                    tracing::warn!(%method, recurso = label, "corpo não é JSON: {}", e);
                    return Err(AppError::MalformedResponse(format!("corpo não é JSON: {e}")));
                }
            }
        };

        if !status.is_success() {
            let message = body.as_ref().and_then(envelope::envelope_message);
            tracing::warn!(%method, recurso = label, status = status.as_u16(), "requisição recusada");
            return Err(AppError::Request { status: status.as_u16(), message });
        }

        tracing::debug!(%method, recurso = label, status = status.as_u16(), "ok");
        Ok((status.as_u16(), body))
    }
}
