// src/models/envelope.rs

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::common::error::AppError;

// O envelope padrão do backend:
// { success, message, data, statusCode, timestamp }
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    // Ausente conta como sucesso: só `false` explícito é falha
    pub success: Option<bool>,
    pub message: Option<String>,
    pub data: Option<T>,
    pub status_code: Option<u16>,
    // O backend manda ISO-8601 ou epoch; guardamos cru
    pub timestamp: Option<Value>,
}

/// `data` das listagens paginadas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    pub fn empty(number: u32, size: u32) -> Self {
        Self { content: Vec::new(), total_elements: 0, total_pages: 0, number, size }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
        }
    }
}

// ---
// Interpretação do envelope
// ---

/// Extrai a mensagem do envelope, se o corpo for um envelope.
pub fn envelope_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

/// Interpreta o corpo de uma resposta 2xx.
///
/// `success: false` vira `AppError::Request`, mesmo com HTTP 200.
/// Envelope sem `data` (ou com `data` no formato errado) vira
/// `AppError::MalformedResponse`.
pub fn unwrap_data<T: DeserializeOwned>(status: u16, body: Value) -> Result<T, AppError> {
    let envelope: ApiEnvelope<Value> = serde_json::from_value(body)
        .map_err(|e| AppError::MalformedResponse(format!("envelope inválido: {e}")))?;

    if envelope.success == Some(false) {
        return Err(AppError::Request {
            status: envelope.status_code.unwrap_or(status),
            message: envelope.message.filter(|m| !m.trim().is_empty()),
        });
    }

    let data = envelope
        .data
        .filter(|d| !d.is_null())
        .ok_or_else(|| AppError::MalformedResponse("envelope sem `data`".into()))?;

    serde_json::from_value(data)
        .map_err(|e| AppError::MalformedResponse(format!("`data` com formato inesperado: {e}")))
}

/// Igual a `unwrap_data`, mas para operações cujo `data` não interessa (DELETE).
pub fn check_success(status: u16, body: Option<Value>) -> Result<(), AppError> {
    // DELETE pode voltar 204 sem corpo
    let Some(body) = body else { return Ok(()) };

    let envelope: ApiEnvelope<Value> = serde_json::from_value(body)
        .map_err(|e| AppError::MalformedResponse(format!("envelope inválido: {e}")))?;

    if envelope.success == Some(false) {
        return Err(AppError::Request {
            status: envelope.status_code.unwrap_or(status),
            message: envelope.message.filter(|m| !m.trim().is_empty()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: i64,
    }

    #[test]
    fn page_is_extracted_from_data() {
        let body = json!({
            "success": true,
            "message": "ok",
            "data": { "content": [{"id": 1}, {"id": 2}], "totalElements": 2, "totalPages": 1, "number": 0, "size": 10 },
            "statusCode": 200,
            "timestamp": "2026-01-01T00:00:00Z"
        });
        let page: Page<Row> = unwrap_data(200, body).unwrap();
        assert_eq!(page.content, vec![Row { id: 1 }, Row { id: 2 }]);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn success_false_is_a_request_failure_with_message() {
        let body = json!({ "success": false, "message": "Lead not found", "statusCode": 404 });
        let err = unwrap_data::<Page<Row>>(200, body).unwrap_err();
        assert!(matches!(err, AppError::Request { status: 404, message: Some(ref m) } if m == "Lead not found"));
    }

    #[test]
    fn missing_content_is_malformed() {
        let body = json!({ "success": true, "data": { "totalPages": 3 } });
        let err = unwrap_data::<Page<Row>>(200, body).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));

        let body = json!({ "success": true });
        assert!(matches!(unwrap_data::<Page<Row>>(200, body), Err(AppError::MalformedResponse(_))));
    }

    #[test]
    fn missing_success_flag_with_data_is_accepted() {
        let body = json!({ "data": { "content": [], "totalPages": 0 } });
        let page: Page<Row> = unwrap_data(200, body).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total_elements, 0);
    }

    #[test]
    fn non_object_body_is_malformed() {
        assert!(matches!(unwrap_data::<Row>(200, json!([1, 2, 3])), Err(AppError::MalformedResponse(_))));
    }

    #[test]
    fn delete_without_body_is_ok() {
        assert!(check_success(204, None).is_ok());
        assert!(matches!(
            check_success(200, Some(json!({ "success": false }))),
            Err(AppError::Request { message: None, .. })
        ));
    }
}
