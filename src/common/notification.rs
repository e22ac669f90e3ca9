// src/common/notification.rs

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Um toast. Dispensável pelo usuário, nunca fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// Fila compartilhada de toasts. Clonar é barato: todas as telas
// de um mesmo AppState escrevem na mesma fila.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    queue: Arc<Mutex<Vec<Notification>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Error, message.into());
    }

    fn push(&self, level: NotificationLevel, message: String) {
        match level {
            NotificationLevel::Success => tracing::info!(toast = %message, "notificação"),
            NotificationLevel::Error => tracing::warn!(toast = %message, "notificação de erro"),
        }

        let notification = Notification { id: Uuid::new_v4(), level, message, created_at: Utc::now() };
        // Mutex envenenado só acontece se alguém entrou em pânico segurando a fila
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.push(notification);
    }

    /// Retorna os toasts pendentes e esvazia a fila.
    pub fn drain(&self) -> Vec<Notification> {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *queue)
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Remove um toast pelo ID (o "X" do toast).
    pub fn dismiss(&self, id: Uuid) -> Option<Notification> {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        let pos = queue.iter().position(|n| n.id == id)?;
        Some(queue.remove(pos))
    }

    pub fn last(&self) -> Option<Notification> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).last().cloned()
    }
}
