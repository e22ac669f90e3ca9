// src/models/inventory.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    client::resource::{Resource, ResourceId},
    validation::{non_zero, not_blank, not_negative, positive, CrossFieldRules, FieldErrors},
};

// --- 1. Itens / Produtos ---
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: ResourceId,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub quantity_on_hand: Decimal, // Quantidade FÍSICA total
    pub reorder_level: Option<Decimal>,
    pub location: Option<String>,
}

impl InventoryItem {
    /// Alerta de estoque baixo: saldo no nível de reposição ou abaixo.
    pub fn is_low_stock(&self) -> bool {
        self.reorder_level.is_some_and(|level| self.quantity_on_hand <= level)
    }

    /// `None` quando o produto estoura o `Decimal`.
    pub fn stock_value(&self) -> Option<Decimal> {
        self.unit_price.unwrap_or(Decimal::ZERO).checked_mul(self.quantity_on_hand)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryItemPayload {
    #[validate(custom(function = "not_blank"))]
    pub sku: String,

    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[validate(custom(function = "not_negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    #[validate(custom(function = "not_negative"))]
    pub quantity_on_hand: Decimal,

    #[validate(custom(function = "not_negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reorder_level: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl CrossFieldRules for InventoryItemPayload {}

pub struct InventoryItems;

impl Resource for InventoryItems {
    type Record = InventoryItem;
    type Payload = InventoryItemPayload;

    const PATH: &'static str = "items";
    const LABEL: &'static str = "Item";
    const PLURAL: &'static str = "items";
    const SEARCH_FIELDS: &'static [&'static str] = &["sku", "name", "category"];

    fn id(record: &InventoryItem) -> ResourceId {
        record.id.clone()
    }

    fn display_name(record: &InventoryItem) -> String {
        format!("{} ({})", record.name, record.sku)
    }
}

// --- 2. Ajuste de estoque ---

// Não existe piso de estoque: um ajuste que deixa o saldo negativo é
// apenas destacado na tela, nunca bloqueado.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct StockAdjustmentPayload {
    #[validate(custom(function = "non_zero"))]
    pub adjustment: Decimal,

    #[validate(custom(function = "not_blank"))]
    pub reason: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CrossFieldRules for StockAdjustmentPayload {}

/// Prévia mostrada enquanto o usuário digita o ajuste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentPreview {
    pub current_quantity: Decimal,
    pub adjustment: Decimal,
    pub new_quantity: Decimal,
    pub is_negative: bool,
}

impl AdjustmentPreview {
    /// Sem prévia quando a soma sai da faixa do `Decimal`.
    pub fn compute(quantity_on_hand: Decimal, adjustment: Decimal) -> Option<Self> {
        let new_quantity = quantity_on_hand.checked_add(adjustment)?;
        Some(Self {
            current_quantity: quantity_on_hand,
            adjustment,
            new_quantity,
            is_negative: new_quantity < Decimal::ZERO,
        })
    }
}

// --- 3. Transferência entre locais ---

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct StockTransferPayload {
    #[validate(custom(function = "not_blank"))]
    pub source_location: String,

    #[validate(custom(function = "not_blank"))]
    pub destination_location: String,

    #[validate(custom(function = "positive"))]
    pub quantity: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CrossFieldRules for StockTransferPayload {
    fn check_cross_fields(&self, errors: &mut FieldErrors) {
        if self.source_location.trim().eq_ignore_ascii_case(self.destination_location.trim()) {
            errors.insert(
                "destinationLocation",
                "The destination must be different from the source.",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::error::AppError, validation::validate_form};

    #[test]
    fn negative_result_is_flagged_not_rejected() {
        let preview = AdjustmentPreview::compute(Decimal::from(3), Decimal::from(-5)).unwrap();
        assert_eq!(preview.new_quantity, Decimal::from(-2));
        assert!(preview.is_negative);

        let payload = StockAdjustmentPayload {
            adjustment: Decimal::from(-5),
            reason: "Damaged".into(),
            notes: None,
        };
        assert!(validate_form(&payload).is_ok());
    }

    #[test]
    fn zero_adjustment_is_rejected() {
        let payload = StockAdjustmentPayload { reason: "Count".into(), ..Default::default() };
        let AppError::Validation(fields) = validate_form(&payload).unwrap_err() else { panic!() };
        assert!(fields.contains("adjustment"));
    }

    #[test]
    fn transfer_to_same_location_is_rejected() {
        let payload = StockTransferPayload {
            source_location: "WH-1".into(),
            destination_location: "wh-1".into(),
            quantity: Decimal::from(4),
            notes: None,
        };
        let AppError::Validation(fields) = validate_form(&payload).unwrap_err() else { panic!() };
        assert_eq!(
            fields.get("destinationLocation"),
            Some("The destination must be different from the source.")
        );
    }

    #[test]
    fn low_stock_flag() {
        let item = InventoryItem {
            id: ResourceId::Int(1),
            sku: "SKU-1".into(),
            name: "Widget".into(),
            category: None,
            unit_price: Some(Decimal::from(2)),
            quantity_on_hand: Decimal::from(5),
            reorder_level: Some(Decimal::from(5)),
            location: None,
        };
        assert!(item.is_low_stock());
        assert_eq!(item.stock_value(), Some(Decimal::from(10)));
    }

    #[test]
    fn huge_values_do_not_panic() {
        let item: InventoryItem = serde_json::from_value(serde_json::json!({
            "id": 1,
            "sku": "SKU-1",
            "name": "Widget",
            "quantityOnHand": 1e15,
            "unitPrice": 1e15
        }))
        .unwrap();
        assert_eq!(item.stock_value(), None);
        assert!(AdjustmentPreview::compute(Decimal::MAX, Decimal::ONE).is_none());
    }
}
