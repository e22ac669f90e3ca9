// src/common/error.rs

use thiserror::Error;

use crate::validation::FieldErrors;

pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "Received an unexpected response from the server.";

// Nosso tipo de erro. Cada variante é uma categoria da taxonomia de falhas
// da tela: validação, requisição recusada, rede e resposta malformada.
#[derive(Debug, Error)]
pub enum AppError {
    // Pego antes de qualquer chamada de rede, mostrado campo a campo
    #[error("Erro de validação em {} campo(s)", .0.len())]
    Validation(FieldErrors),

    // HTTP fora de 2xx ou envelope com `success: false`
    #[error("Requisição recusada ({status}): {}", .message.as_deref().unwrap_or("sem mensagem"))]
    Request {
        status: u16,
        message: Option<String>,
    },

    // Falha no transporte (DNS, conexão recusada, timeout...)
    #[error("Erro de rede: {0}")]
    Network(String),

    // Envelope com formato inesperado (ex: sem `data.content`)
    #[error("Resposta malformada: {0}")]
    MalformedResponse(String),

    // A tela foi fechada com a requisição ainda em andamento
    #[error("Requisição cancelada")]
    Cancelled,

    #[error("Configuração inválida: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Texto do toast para esta falha.
    ///
    /// A mensagem do backend é repassada literalmente quando existe;
    /// caso contrário usamos o `fallback` da operação.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Request { message: Some(msg), .. } if !msg.trim().is_empty() => msg.clone(),
            AppError::Request { .. } => fallback.to_string(),
            AppError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            AppError::MalformedResponse(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
            AppError::Validation(_) => "Please correct the highlighted fields.".to_string(),
            AppError::Cancelled | AppError::Config(_) => fallback.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        // Corpo que não bate com o tipo esperado não é problema de rede
        if e.is_decode() {
            return AppError::MalformedResponse(e.to_string());
        }
        AppError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::MalformedResponse(e.to_string())
    }
}
