// src/config.rs

use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    client::http::ResourceClient,
    common::{error::AppError, notification::Notifier},
    models::query::{FilterMode, PaginationStyle},
};

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_API_PREFIX: &str = "/api/v1";
const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// Configuração única do cliente, compartilhada por todas as telas.
/// Base URL e nomes dos parâmetros de paginação vêm daqui e de mais nenhum lugar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub page_size: u32,
    pub pagination_style: PaginationStyle,
    pub filter_mode: FilterMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            pagination_style: PaginationStyle::default(),
            filter_mode: FilterMode::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            ..Self::default()
        }
    }

    /// Lê as variáveis `CRM_*` (depois de carregar o `.env`, se existir).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separado do `from_env` para testar sem mexer no ambiente do processo
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("CRM_API_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = normalize_base_url(&url);
        }
        if let Some(prefix) = lookup("CRM_API_PREFIX") {
            config.api_prefix = prefix.trim().to_string();
        }
        if let Some(size) = lookup("CRM_PAGE_SIZE") {
            let size: u32 = size
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("CRM_PAGE_SIZE inválido: '{size}'")))?;
            if size == 0 || size > MAX_PAGE_SIZE {
                return Err(AppError::Config(format!(
                    "CRM_PAGE_SIZE deve estar entre 1 e {MAX_PAGE_SIZE}"
                )));
            }
            config.page_size = size;
        }
        if let Some(style) = lookup("CRM_PAGINATION_STYLE") {
            config.pagination_style = style.parse()?;
        }
        if let Some(mode) = lookup("CRM_FILTER_MODE") {
            config.filter_mode = mode.parse()?;
        }

        Ok(config)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

// O estado compartilhado por todas as telas do painel
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub client: ResourceClient,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new() -> Result<Self, AppError> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, AppError> {
        // Sem timeout próprio: vale o do sistema. Só limitamos a conexão.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Config(format!("falha ao montar o cliente HTTP: {e}")))?;

        let config = Arc::new(config);
        tracing::info!(base_url = %config.base_url, prefixo = %config.api_prefix, "cliente configurado");

        Ok(Self {
            client: ResourceClient::with_client(http, config.clone()),
            config,
            notifier: Notifier::new(),
        })
    }
}
