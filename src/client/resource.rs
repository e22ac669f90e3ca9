// src/client/resource.rs

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::{common::error::AppError, validation::CrossFieldRules};

/// Identificador opaco atribuído pelo backend. Algumas telas usam
/// inteiros, outras strings; no JSON vem sem tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(id) => write!(f, "{id}"),
            ResourceId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Int(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::Text(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId::Text(id)
    }
}

/// Descreve um recurso de gestão (lead, território, item...): onde ele
/// mora na API, como se chama na tela e como buscar/filtrar suas linhas.
///
/// O mesmo payload serve para criar (POST) e editar (PATCH).
pub trait Resource: Send + Sync + 'static {
    type Record: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Payload: Clone
        + fmt::Debug
        + Default
        + Serialize
        + DeserializeOwned
        + Validate
        + CrossFieldRules
        + Send
        + Sync
        + 'static;

    /// Segmento da coleção, ex: `territories`.
    const PATH: &'static str;
    /// Nome no singular para os toasts, ex: `Territory`.
    const LABEL: &'static str;
    /// Plural usado na linha "No ... found".
    const PLURAL: &'static str;
    /// Colunas (camelCase) que a busca livre examina.
    const SEARCH_FIELDS: &'static [&'static str];

    fn id(record: &Self::Record) -> ResourceId;

    /// Como o registro aparece no modal de confirmação.
    fn display_name(record: &Self::Record) -> String;

    /// Valor textual de uma coluna, para filtros e ordenação.
    fn column(record: &Self::Record, name: &str) -> Option<String> {
        let value = serde_json::to_value(record).ok()?;
        value_to_text(value.get(name)?)
    }

    fn search_text(record: &Self::Record) -> String {
        Self::SEARCH_FIELDS
            .iter()
            .filter_map(|field| Self::column(record, field))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Busca livre sem diferenciar maiúsculas.
    fn matches_search(record: &Self::Record, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty() || Self::search_text(record).to_lowercase().contains(&term)
    }

    /// Filtro de coluna: igualdade exata, sem diferenciar maiúsculas.
    fn matches_filters<'a>(
        record: &Self::Record,
        filters: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> bool {
        filters.into_iter().all(|(column, expected)| {
            Self::column(record, column).is_some_and(|actual| actual.eq_ignore_ascii_case(expected))
        })
    }

    /// Payload de edição preenchido a partir do registro.
    fn to_payload(record: &Self::Record) -> Result<Self::Payload, AppError> {
        let mut value = serde_json::to_value(record)?;
        // Campos nulos no registro ficam com o default do formulário
        if let Value::Object(map) = &mut value {
            map.retain(|_, v| !v.is_null());
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
