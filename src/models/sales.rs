// src/models/sales.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    client::resource::{Resource, ResourceId},
    validation::{not_negative, positive, CrossFieldRules, FieldErrors},
};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SalesDocumentStatus {
    Draft,
    Confirmed,
    Delivered,
    Paid,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer, // Vira "BANK_TRANSFER"
    Cheque,
}

// --- Linhas (compartilhadas por pedido, fatura e nota de entrega) ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    #[validate(required(message = "This field is required."))]
    pub item_id: Option<ResourceId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(custom(function = "positive"))]
    pub quantity: Decimal,

    #[validate(custom(function = "not_negative"))]
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn total(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }
}

/// Soma das linhas; `None` se alguma conta estourar.
pub fn lines_total(lines: &[LineItem]) -> Option<Decimal> {
    lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.total()?))
}

// =============================================================================
//  PEDIDOS DE VENDA
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrder {
    pub id: ResourceId,
    pub order_number: Option<String>,
    pub customer_id: Option<ResourceId>,
    pub order_date: Option<NaiveDate>,
    pub status: Option<SalesDocumentStatus>,
    #[serde(default)]
    pub lines: Vec<LineItem>,
    pub total_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesOrderPayload {
    #[validate(required(message = "This field is required."))]
    pub customer_id: Option<ResourceId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SalesDocumentStatus>,

    #[validate(length(min = 1, message = "Add at least one line."), nested)]
    pub lines: Vec<LineItem>,
}

impl CrossFieldRules for SalesOrderPayload {}

pub struct SalesOrders;

impl Resource for SalesOrders {
    type Record = SalesOrder;
    type Payload = SalesOrderPayload;

    const PATH: &'static str = "sales-orders";
    const LABEL: &'static str = "Sales order";
    const PLURAL: &'static str = "sales orders";
    const SEARCH_FIELDS: &'static [&'static str] = &["orderNumber", "customerId"];

    fn id(record: &SalesOrder) -> ResourceId {
        record.id.clone()
    }

    fn display_name(record: &SalesOrder) -> String {
        record.order_number.clone().unwrap_or_else(|| format!("#{}", record.id))
    }
}

// =============================================================================
//  FATURAS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: ResourceId,
    pub invoice_number: Option<String>,
    pub customer_id: Option<ResourceId>,
    pub sales_order_id: Option<ResourceId>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<SalesDocumentStatus>,
    #[serde(default)]
    pub lines: Vec<LineItem>,
    pub total_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoicePayload {
    #[validate(required(message = "This field is required."))]
    pub customer_id: Option<ResourceId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_order_id: Option<ResourceId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SalesDocumentStatus>,

    #[validate(length(min = 1, message = "Add at least one line."), nested)]
    pub lines: Vec<LineItem>,
}

impl CrossFieldRules for InvoicePayload {
    fn check_cross_fields(&self, errors: &mut FieldErrors) {
        if let (Some(issue), Some(due)) = (self.issue_date, self.due_date) {
            if due < issue {
                errors.insert("dueDate", "The due date cannot be before the issue date.");
            }
        }
    }
}

pub struct Invoices;

impl Resource for Invoices {
    type Record = Invoice;
    type Payload = InvoicePayload;

    const PATH: &'static str = "invoices";
    const LABEL: &'static str = "Invoice";
    const PLURAL: &'static str = "invoices";
    const SEARCH_FIELDS: &'static [&'static str] = &["invoiceNumber", "customerId"];

    fn id(record: &Invoice) -> ResourceId {
        record.id.clone()
    }

    fn display_name(record: &Invoice) -> String {
        record.invoice_number.clone().unwrap_or_else(|| format!("#{}", record.id))
    }
}

// =============================================================================
//  NOTAS DE ENTREGA
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryNote {
    pub id: ResourceId,
    pub delivery_number: Option<String>,
    pub customer_id: Option<ResourceId>,
    pub sales_order_id: Option<ResourceId>,
    pub delivery_date: Option<NaiveDate>,
    pub status: Option<SalesDocumentStatus>,
    #[serde(default)]
    pub lines: Vec<LineItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryNotePayload {
    #[validate(required(message = "This field is required."))]
    pub customer_id: Option<ResourceId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_order_id: Option<ResourceId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SalesDocumentStatus>,

    #[validate(length(min = 1, message = "Add at least one line."), nested)]
    pub lines: Vec<LineItem>,
}

impl CrossFieldRules for DeliveryNotePayload {}

pub struct DeliveryNotes;

impl Resource for DeliveryNotes {
    type Record = DeliveryNote;
    type Payload = DeliveryNotePayload;

    const PATH: &'static str = "delivery-notes";
    const LABEL: &'static str = "Delivery note";
    const PLURAL: &'static str = "delivery notes";
    const SEARCH_FIELDS: &'static [&'static str] = &["deliveryNumber", "customerId"];

    fn id(record: &DeliveryNote) -> ResourceId {
        record.id.clone()
    }

    fn display_name(record: &DeliveryNote) -> String {
        record.delivery_number.clone().unwrap_or_else(|| format!("#{}", record.id))
    }
}

// =============================================================================
//  PAGAMENTOS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: ResourceId,
    pub invoice_id: Option<ResourceId>,
    pub amount: Decimal,
    pub method: Option<PaymentMethod>,
    pub payment_date: Option<NaiveDate>,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentPayload {
    #[validate(required(message = "This field is required."))]
    pub invoice_id: Option<ResourceId>,

    #[validate(custom(function = "positive"))]
    pub amount: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl CrossFieldRules for PaymentPayload {}

pub struct Payments;

impl Resource for Payments {
    type Record = Payment;
    type Payload = PaymentPayload;

    const PATH: &'static str = "payments";
    const LABEL: &'static str = "Payment";
    const PLURAL: &'static str = "payments";
    const SEARCH_FIELDS: &'static [&'static str] = &["reference", "invoiceId"];

    fn id(record: &Payment) -> ResourceId {
        record.id.clone()
    }

    fn display_name(record: &Payment) -> String {
        match &record.reference {
            Some(reference) => format!("{reference} ({})", record.amount),
            None => format!("#{} ({})", record.id, record.amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::error::AppError, validation::validate_form};

    fn line(quantity: i64, price: i64) -> LineItem {
        LineItem {
            item_id: Some(ResourceId::Int(9)),
            description: None,
            quantity: Decimal::from(quantity),
            unit_price: Decimal::from(price),
        }
    }

    #[test]
    fn order_without_lines_is_rejected() {
        let payload = SalesOrderPayload {
            customer_id: Some(ResourceId::Int(1)),
            ..Default::default()
        };
        let AppError::Validation(fields) = validate_form(&payload).unwrap_err() else { panic!() };
        assert_eq!(fields.get("lines"), Some("Add at least one line."));
    }

    #[test]
    fn nested_line_errors_are_indexed() {
        let payload = SalesOrderPayload {
            customer_id: Some(ResourceId::Int(1)),
            lines: vec![line(2, 10), line(0, 10)],
            ..Default::default()
        };
        let AppError::Validation(fields) = validate_form(&payload).unwrap_err() else { panic!() };
        assert!(fields.contains("lines[1].quantity"));
        assert!(!fields.contains("lines[0].quantity"));
    }

    #[test]
    fn invoice_due_before_issue_is_rejected() {
        let payload = InvoicePayload {
            customer_id: Some(ResourceId::Int(1)),
            issue_date: NaiveDate::from_ymd_opt(2026, 5, 10),
            due_date: NaiveDate::from_ymd_opt(2026, 5, 1),
            lines: vec![line(1, 100)],
            ..Default::default()
        };
        let AppError::Validation(fields) = validate_form(&payload).unwrap_err() else { panic!() };
        assert!(fields.contains("dueDate"));
    }

    #[test]
    fn totals() {
        assert_eq!(lines_total(&[line(2, 10), line(3, 5)]), Some(Decimal::from(35)));

        let huge = LineItem { quantity: Decimal::MAX, unit_price: Decimal::from(2), ..line(1, 1) };
        assert_eq!(huge.total(), None);
        assert_eq!(lines_total(&[line(1, 1), huge]), None);
    }

    #[test]
    fn payment_amount_must_be_positive() {
        let payload = PaymentPayload { invoice_id: Some(ResourceId::Int(4)), ..Default::default() };
        let AppError::Validation(fields) = validate_form(&payload).unwrap_err() else { panic!() };
        assert!(fields.contains("amount"));
    }
}
