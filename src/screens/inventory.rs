// src/screens/inventory.rs

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::Validate;

use crate::{
    client::{
        http::ResourceClient,
        memory::InMemoryRepository,
        repository::{HttpRepository, ResourceRepository},
        resource::{Resource, ResourceId},
    },
    common::{
        error::{AppError, AppResult},
        notification::Notifier,
    },
    config::{AppState, ClientConfig},
    models::inventory::{
        AdjustmentPreview, InventoryItem, InventoryItems, StockAdjustmentPayload, StockTransferPayload,
    },
    ui::{
        mutation::{MutationFlow, MutationMessages, SubmitOutcome},
        screen::ManagementScreen,
    },
    validation::{CrossFieldRules, FieldErrors},
};

// =============================================================================
//  AÇÕES DE ESTOQUE
// =============================================================================

/// Movimentações que não são CRUD puro: ajuste e transferência.
#[async_trait]
pub trait InventoryActions: Send + Sync {
    /// `POST /items/{id}/adjustments`
    async fn adjust(&self, id: &ResourceId, payload: &StockAdjustmentPayload) -> AppResult<InventoryItem>;

    /// `POST /items/{id}/transfers`
    async fn transfer(&self, id: &ResourceId, payload: &StockTransferPayload) -> AppResult<InventoryItem>;
}

#[async_trait]
impl InventoryActions for ResourceClient {
    async fn adjust(&self, id: &ResourceId, payload: &StockAdjustmentPayload) -> AppResult<InventoryItem> {
        let id = id.to_string();
        self.post_action(&[InventoryItems::PATH, &id, "adjustments"], payload).await
    }

    async fn transfer(&self, id: &ResourceId, payload: &StockTransferPayload) -> AppResult<InventoryItem> {
        let id = id.to_string();
        self.post_action(&[InventoryItems::PATH, &id, "transfers"], payload).await
    }
}

#[async_trait]
impl InventoryActions for InMemoryRepository<InventoryItems> {
    async fn adjust(&self, id: &ResourceId, payload: &StockAdjustmentPayload) -> AppResult<InventoryItem> {
        let item = self.get(id).await?;
        // Saldo negativo é permitido; só o estouro do Decimal é recusado
        let new_quantity = item
            .quantity_on_hand
            .checked_add(payload.adjustment)
            .ok_or_else(|| AppError::Request {
                status: 400,
                message: Some("Adjustment is out of range".to_string()),
            })?;
        self.modify(id, |item| item.quantity_on_hand = new_quantity)
    }

    async fn transfer(&self, id: &ResourceId, payload: &StockTransferPayload) -> AppResult<InventoryItem> {
        let item = self.get(id).await?;
        if payload.quantity > item.quantity_on_hand {
            return Err(AppError::Request {
                status: 400,
                message: Some(format!(
                    "Insufficient stock at {}: {} available",
                    payload.source_location, item.quantity_on_hand
                )),
            });
        }
        // Um registro só guarda um local: a transferência total muda o local do item
        let destination = payload.destination_location.clone();
        let moves_everything = payload.quantity == item.quantity_on_hand;
        self.modify(id, |item| {
            if moves_everything {
                item.location = Some(destination);
            }
        })
    }
}

// =============================================================================
//  DIÁLOGO DE AÇÃO (ajuste / transferência)
// =============================================================================

struct ActionInner<P> {
    target: Option<InventoryItem>,
    draft: P,
    errors: FieldErrors,
}

/// Diálogo aberto sobre um item específico da lista.
struct ActionDialog<P> {
    flow: MutationFlow,
    inner: Mutex<ActionInner<P>>,
}

impl<P> ActionDialog<P>
where
    P: Clone + Default + Validate + CrossFieldRules,
{
    fn new(flow: MutationFlow) -> Self {
        Self {
            flow,
            inner: Mutex::new(ActionInner { target: None, draft: P::default(), errors: FieldErrors::new() }),
        }
    }

    fn open(&self, item: &InventoryItem) -> bool {
        if !self.flow.begin_editing() {
            return false;
        }
        *self.lock() = ActionInner { target: Some(item.clone()), draft: P::default(), errors: FieldErrors::new() };
        true
    }

    fn edit<F: FnOnce(&mut P)>(&self, change: F) {
        let mut inner = self.lock();
        if inner.target.is_some() {
            change(&mut inner.draft);
        }
    }

    fn cancel(&self) -> bool {
        if !self.flow.reset() {
            return false;
        }
        self.close();
        true
    }

    fn close(&self) {
        *self.lock() = ActionInner { target: None, draft: P::default(), errors: FieldErrors::new() };
    }

    async fn submit<F, Fut>(&self, messages: &MutationMessages, op: F) -> SubmitOutcome<InventoryItem>
    where
        F: FnOnce(InventoryItem, P) -> Fut,
        Fut: Future<Output = AppResult<InventoryItem>>,
    {
        let (target, draft) = {
            let inner = self.lock();
            match &inner.target {
                Some(target) => (target.clone(), inner.draft.clone()),
                None => return SubmitOutcome::Ignored,
            }
        };

        let outcome = self.flow.submit(&draft, messages, || op(target, draft.clone())).await;
        match &outcome {
            SubmitOutcome::Saved(_) => {
                self.close();
                self.flow.reset();
            }
            SubmitOutcome::Invalid(fields) => self.lock().errors = fields.clone(),
            _ => {}
        }
        outcome
    }

    fn lock(&self) -> MutexGuard<'_, ActionInner<P>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// =============================================================================
//  TELA DE ESTOQUE
// =============================================================================

/// Cartões de resumo no topo da tela de estoque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_items: u64,
    pub low_stock: usize,
    /// `None` quando os valores da página não cabem num `Decimal`.
    pub stock_value: Option<Decimal>,
}

pub struct InventoryScreen {
    screen: ManagementScreen<InventoryItems>,
    actions: Arc<dyn InventoryActions>,
    adjustment: ActionDialog<StockAdjustmentPayload>,
    transfer: ActionDialog<StockTransferPayload>,
}

impl InventoryScreen {
    pub fn new(
        repo: Arc<dyn ResourceRepository<InventoryItems>>,
        actions: Arc<dyn InventoryActions>,
        config: &ClientConfig,
        notifier: Notifier,
    ) -> Self {
        let screen = ManagementScreen::new(repo, config, notifier.clone());
        let adjustment = ActionDialog::new(MutationFlow::new(notifier.clone(), screen.child_token()));
        let transfer = ActionDialog::new(MutationFlow::new(notifier, screen.child_token()));
        Self { screen, actions, adjustment, transfer }
    }

    pub fn from_state(state: &AppState) -> Self {
        let repo: Arc<dyn ResourceRepository<InventoryItems>> =
            Arc::new(HttpRepository::<InventoryItems>::new(state.client.clone()));
        Self::new(repo, Arc::new(state.client.clone()), &state.config, state.notifier.clone())
    }

    /// Fake em memória servindo tanto o CRUD quanto as ações.
    pub fn in_memory(repo: Arc<InMemoryRepository<InventoryItems>>, config: &ClientConfig, notifier: Notifier) -> Self {
        Self::new(repo.clone(), repo, config, notifier)
    }

    /// Lista, formulário e exclusão de itens.
    pub fn screen(&self) -> &ManagementScreen<InventoryItems> {
        &self.screen
    }

    pub fn stats(&self) -> InventoryStats {
        let view = self.screen.list().view();
        let stock_value = view
            .rows
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.stock_value()?));
        if stock_value.is_none() {
            tracing::warn!("valor do estoque estourou o Decimal; cartão fica vazio");
        }
        InventoryStats {
            total_items: view.total_elements,
            low_stock: view.rows.iter().filter(|i| i.is_low_stock()).count(),
            stock_value,
        }
    }

    // ---- ajuste ----

    pub fn open_adjustment(&self, item: &InventoryItem) -> bool {
        self.adjustment.open(item)
    }

    pub fn edit_adjustment<F: FnOnce(&mut StockAdjustmentPayload)>(&self, change: F) {
        self.adjustment.edit(change);
    }

    pub fn adjustment_errors(&self) -> FieldErrors {
        self.adjustment.lock().errors.clone()
    }

    /// Saldo resultante, recalculado a cada digitação.
    pub fn adjustment_preview(&self) -> Option<AdjustmentPreview> {
        let inner = self.adjustment.lock();
        let item = inner.target.as_ref()?;
        AdjustmentPreview::compute(item.quantity_on_hand, inner.draft.adjustment)
    }

    pub fn cancel_adjustment(&self) -> bool {
        self.adjustment.cancel()
    }

    pub async fn submit_adjustment(&self) -> SubmitOutcome<InventoryItem> {
        let actions = self.actions.clone();
        let messages = MutationMessages::new("Stock adjusted successfully", "Failed to adjust stock");
        let outcome = self
            .adjustment
            .submit(&messages, |item, draft| async move { actions.adjust(&item.id, &draft).await })
            .await;
        if outcome.is_saved() {
            self.screen.list().refresh().await;
        }
        outcome
    }

    // ---- transferência ----

    /// Abre a transferência com o local atual do item como origem.
    pub fn open_transfer(&self, item: &InventoryItem) -> bool {
        if !self.transfer.open(item) {
            return false;
        }
        let source = item.location.clone().unwrap_or_default();
        self.transfer.edit(|draft| draft.source_location = source);
        true
    }

    pub fn edit_transfer<F: FnOnce(&mut StockTransferPayload)>(&self, change: F) {
        self.transfer.edit(change);
    }

    pub fn transfer_errors(&self) -> FieldErrors {
        self.transfer.lock().errors.clone()
    }

    pub fn cancel_transfer(&self) -> bool {
        self.transfer.cancel()
    }

    pub async fn submit_transfer(&self) -> SubmitOutcome<InventoryItem> {
        let actions = self.actions.clone();
        let messages = MutationMessages::new("Stock transferred successfully", "Failed to transfer stock");
        let outcome = self
            .transfer
            .submit(&messages, |item, draft| async move { actions.transfer(&item.id, &draft).await })
            .await;
        if outcome.is_saved() {
            self.screen.list().refresh().await;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: i64, on_hand: i64, reorder: i64, price: i64) -> InventoryItem {
        serde_json::from_value(json!({
            "id": id,
            "sku": format!("SKU-{id}"),
            "name": format!("Item {id}"),
            "unitPrice": price,
            "quantityOnHand": on_hand,
            "reorderLevel": reorder,
            "location": "WH-1"
        }))
        .unwrap()
    }

    fn screen(items: Vec<InventoryItem>) -> (Arc<InMemoryRepository<InventoryItems>>, InventoryScreen, Notifier) {
        let repo = Arc::new(InMemoryRepository::<InventoryItems>::with_records(items));
        let notifier = Notifier::new();
        let screen = InventoryScreen::in_memory(repo.clone(), &ClientConfig::default(), notifier.clone());
        (repo, screen, notifier)
    }

    #[tokio::test]
    async fn negative_adjustment_is_previewed_and_allowed() {
        let (repo, inv, notifier) = screen(vec![item(1, 3, 1, 10)]);
        inv.screen().open().await;

        assert!(inv.open_adjustment(&item(1, 3, 1, 10)));
        inv.edit_adjustment(|d| {
            d.adjustment = Decimal::from(-5);
            d.reason = "Damaged".into();
        });

        let preview = inv.adjustment_preview().unwrap();
        assert_eq!(preview.new_quantity, Decimal::from(-2));
        assert!(preview.is_negative);

        let calls_before = repo.call_count();
        let saved = inv.submit_adjustment().await;
        assert!(matches!(saved, SubmitOutcome::Saved(ref i) if i.quantity_on_hand == Decimal::from(-2)));
        assert_eq!(repo.snapshot()[0].quantity_on_hand, Decimal::from(-2));
        assert!(repo.call_count() > calls_before);
        assert_eq!(notifier.last().unwrap().message, "Stock adjusted successfully");
        assert!(inv.adjustment_preview().is_none());
    }

    #[tokio::test]
    async fn adjustment_requires_reason() {
        let (repo, inv, _) = screen(vec![item(1, 3, 1, 10)]);
        inv.open_adjustment(&item(1, 3, 1, 10));
        inv.edit_adjustment(|d| d.adjustment = Decimal::from(2));

        assert!(matches!(inv.submit_adjustment().await, SubmitOutcome::Invalid(_)));
        assert!(inv.adjustment_errors().contains("reason"));
        assert_eq!(repo.call_count(), 0);
        assert_eq!(repo.snapshot()[0].quantity_on_hand, Decimal::from(3));

        // Com o motivo preenchido a ação chega ao repositório
        inv.edit_adjustment(|d| d.reason = "Recount".into());
        assert!(inv.submit_adjustment().await.is_saved());
        assert!(repo.call_count() > 0);
    }

    #[tokio::test]
    async fn adjustment_beyond_decimal_range_fails_without_panicking() {
        let (repo, inv, notifier) = screen(vec![item(1, 3, 1, 10)]);
        inv.open_adjustment(&item(1, 3, 1, 10));
        inv.edit_adjustment(|d| {
            d.adjustment = Decimal::MAX;
            d.reason = "Typo".into();
        });

        assert!(inv.adjustment_preview().is_none());
        assert!(matches!(inv.submit_adjustment().await, SubmitOutcome::Failed(_)));
        assert_eq!(notifier.last().unwrap().message, "Adjustment is out of range");
        assert_eq!(repo.snapshot()[0].quantity_on_hand, Decimal::from(3));
    }

    #[tokio::test]
    async fn stats_survive_values_that_overflow() {
        let huge: InventoryItem = serde_json::from_value(json!({
            "id": 1,
            "sku": "SKU-1",
            "name": "Item 1",
            "unitPrice": 1e15,
            "quantityOnHand": 1e15,
            "reorderLevel": 1
        }))
        .unwrap();
        let (_, inv, _) = screen(vec![huge, item(2, 0, 5, 1)]);
        inv.screen().open().await;

        let stats = inv.stats();
        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.low_stock, 1);
        assert_eq!(stats.stock_value, None);
    }

    #[tokio::test]
    async fn empty_inventory_shows_placeholder_and_zero_stats() {
        let (_, inv, _) = screen(vec![]);
        inv.screen().open().await;

        let view = inv.screen().list().view();
        assert!(view.rows.is_empty());
        assert_eq!(view.empty_row(), Some("No items found"));
        assert_eq!(
            inv.stats(),
            InventoryStats { total_items: 0, low_stock: 0, stock_value: Some(Decimal::ZERO) }
        );
    }

    #[tokio::test]
    async fn transfer_prefills_source_and_rejects_same_destination() {
        let (_, inv, _) = screen(vec![item(1, 8, 2, 1)]);
        inv.open_transfer(&item(1, 8, 2, 1));
        inv.edit_transfer(|d| {
            d.destination_location = "wh-1".into();
            d.quantity = Decimal::from(8);
        });

        assert!(matches!(inv.submit_transfer().await, SubmitOutcome::Invalid(_)));
        assert!(inv.transfer_errors().contains("destinationLocation"));

        inv.edit_transfer(|d| d.destination_location = "WH-2".into());
        assert!(matches!(
            inv.submit_transfer().await,
            SubmitOutcome::Saved(ref i) if i.location.as_deref() == Some("WH-2")
        ));
    }

    #[tokio::test]
    async fn transfer_beyond_stock_shows_backend_message() {
        let (_, inv, notifier) = screen(vec![item(1, 2, 0, 1)]);
        inv.open_transfer(&item(1, 2, 0, 1));
        inv.edit_transfer(|d| {
            d.destination_location = "WH-9".into();
            d.quantity = Decimal::from(5);
        });

        assert!(matches!(inv.submit_transfer().await, SubmitOutcome::Failed(_)));
        assert_eq!(notifier.last().unwrap().message, "Insufficient stock at WH-1: 2 available");
    }

    #[tokio::test]
    async fn stats_follow_the_loaded_page() {
        let (_, inv, _) = screen(vec![item(1, 2, 5, 3), item(2, 10, 5, 1)]);
        inv.screen().open().await;

        let stats = inv.stats();
        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.low_stock, 1);
        assert_eq!(stats.stock_value, Some(Decimal::from(16)));
    }
}
