// src/models/query.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::error::AppError;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Nomes dos parâmetros de paginação que o backend entende.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaginationStyle {
    /// `pageNumber`, `pageSize`, `sortField`, `direction`
    #[default]
    PageNumber,
    /// `page`, `size`, `sort=campo,dir`
    PageSize,
}

impl FromStr for PaginationStyle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "page-number" | "pagenumber" => Ok(PaginationStyle::PageNumber),
            "page-size" | "page" => Ok(PaginationStyle::PageSize),
            other => Err(AppError::Config(format!("estilo de paginação desconhecido: '{other}'"))),
        }
    }
}

/// Onde a busca/filtros são aplicados.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Enviados ao backend como parâmetros; filtram o conjunto inteiro.
    #[default]
    Server,
    /// Aplicados só às linhas da página já baixada.
    PageLocal,
}

impl FromStr for FilterMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(FilterMode::Server),
            "page-local" | "local" => Ok(FilterMode::PageLocal),
            other => Err(AppError::Config(format!("modo de filtro desconhecido: '{other}'"))),
        }
    }
}

// --- CONSULTA DE LISTAGEM ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort_field: Option<String>,
    pub direction: SortDirection,
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            sort_field: None,
            direction: SortDirection::Asc,
            search: None,
            filters: BTreeMap::new(),
        }
    }

    pub fn sorted_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_field = Some(field.into());
        self.direction = direction;
        self
    }

    /// Parâmetros da query string no estilo configurado.
    ///
    /// Busca e filtros só são enviados no modo `Server`; no modo
    /// `PageLocal` eles ficam no cliente.
    pub fn to_params(&self, style: PaginationStyle, mode: FilterMode) -> Vec<(String, String)> {
        let mut params = Vec::new();

        match style {
            PaginationStyle::PageNumber => {
                params.push(("pageNumber".to_string(), self.page.to_string()));
                params.push(("pageSize".to_string(), self.page_size.to_string()));
                if let Some(field) = &self.sort_field {
                    params.push(("sortField".to_string(), field.clone()));
                    params.push(("direction".to_string(), self.direction.as_str().to_string()));
                }
            }
            PaginationStyle::PageSize => {
                params.push(("page".to_string(), self.page.to_string()));
                params.push(("size".to_string(), self.page_size.to_string()));
                if let Some(field) = &self.sort_field {
                    let dir = self.direction.as_str().to_ascii_lowercase();
                    params.push(("sort".to_string(), format!("{field},{dir}")));
                }
            }
        }

        if mode == FilterMode::Server {
            if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                params.push(("search".to_string(), term.to_string()));
            }
            for (column, value) in &self.filters {
                params.push((format!("filter[{column}]"), value.clone()));
            }
        }

        params
    }
}

impl fmt::Display for ListQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page={} size={}", self.page, self.page_size)?;
        if let Some(field) = &self.sort_field {
            write!(f, " sort={field}:{}", self.direction.as_str())?;
        }
        if let Some(term) = &self.search {
            write!(f, " search='{term}'")?;
        }
        Ok(())
    }
}
