//! Painel administrativo do CRM: telas de gestão (listar, criar, editar,
//! excluir) sobre a API REST do backend.

pub mod client;
pub mod common;
pub mod config;
pub mod models;
pub mod screens;
pub mod services;
pub mod ui;
pub mod validation;

pub use common::error::{AppError, AppResult};
pub use config::{AppState, ClientConfig};
