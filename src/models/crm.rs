// src/models/crm.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    client::resource::{Resource, ResourceId},
    validation::{
        not_blank, not_negative, percentage, phone_format, CrossFieldRules, FieldErrors,
    },
};

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Unqualified,
    Converted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpportunityStage {
    Prospecting,
    Qualification,
    Proposal,
    Negotiation,
    ClosedWon,  // Vira "CLOSED_WON"
    ClosedLost, // Vira "CLOSED_LOST"
}

impl OpportunityStage {
    pub fn is_closed(self) -> bool {
        matches!(self, OpportunityStage::ClosedWon | OpportunityStage::ClosedLost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Planned,
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerType {
    Individual,
    Business,
}

// A tela de territórios grava "Active"/"Inactive", não MAIÚSCULAS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerritoryStatus {
    Active,
    Inactive,
}

// =============================================================================
//  LEADS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: ResourceId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: Option<LeadStatus>,
    pub source: Option<String>,
    pub assigned_to: Option<ResourceId>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Lead {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    // A conversão só é oferecida para leads qualificados; o backend decide de fato
    pub fn can_convert(&self) -> bool {
        self.status == Some(LeadStatus::Qualified)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadPayload {
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,

    #[validate(custom(function = "not_blank"))]
    pub last_name: String,

    #[validate(email(message = "Enter a valid email address."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[validate(custom(function = "phone_format"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<ResourceId>,
}

impl CrossFieldRules for LeadPayload {}

pub struct Leads;

impl Resource for Leads {
    type Record = Lead;
    type Payload = LeadPayload;

    const PATH: &'static str = "leads";
    const LABEL: &'static str = "Lead";
    const PLURAL: &'static str = "leads";
    const SEARCH_FIELDS: &'static [&'static str] = &["firstName", "lastName", "email", "company"];

    fn id(record: &Lead) -> ResourceId {
        record.id.clone()
    }

    fn display_name(record: &Lead) -> String {
        record.full_name()
    }
}

// =============================================================================
//  OPORTUNIDADES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: ResourceId,
    pub name: String,
    pub lead_id: Option<ResourceId>,
    pub customer_id: Option<ResourceId>,
    pub amount: Option<Decimal>,
    pub stage: Option<OpportunityStage>,
    pub probability: Option<u8>,
    pub expected_close_date: Option<NaiveDate>,
    pub owner: Option<String>,
}

impl Opportunity {
    pub fn is_closed(&self) -> bool {
        self.stage.is_some_and(OpportunityStage::is_closed)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct OpportunityPayload {
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<ResourceId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<ResourceId>,

    #[validate(custom(function = "not_negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<OpportunityStage>,

    #[validate(range(max = 100, message = "The value must be between 0 and 100."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_close_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl CrossFieldRules for OpportunityPayload {}

pub struct Opportunities;

impl Resource for Opportunities {
    type Record = Opportunity;
    type Payload = OpportunityPayload;

    const PATH: &'static str = "opportunities";
    const LABEL: &'static str = "Opportunity";
    const PLURAL: &'static str = "opportunities";
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "owner"];

    fn id(record: &Opportunity) -> ResourceId {
        record.id.clone()
    }

    fn display_name(record: &Opportunity) -> String {
        record.name.clone()
    }
}

// =============================================================================
//  CLIENTES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: ResourceId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub customer_type: Option<CustomerType>,
    pub address: Option<String>,
    pub territory_id: Option<ResourceId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerPayload {
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[validate(
        required(message = "This field is required."),
        email(message = "Enter a valid email address.")
    )]
    pub email: Option<String>,

    #[validate(custom(function = "phone_format"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<CustomerType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub territory_id: Option<ResourceId>,
}

impl CrossFieldRules for CustomerPayload {}

pub struct Customers;

impl Resource for Customers {
    type Record = Customer;
    type Payload = CustomerPayload;

    const PATH: &'static str = "customers";
    const LABEL: &'static str = "Customer";
    const PLURAL: &'static str = "customers";
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "email", "phone"];

    fn id(record: &Customer) -> ResourceId {
        record.id.clone()
    }

    fn display_name(record: &Customer) -> String {
        record.name.clone()
    }
}

// =============================================================================
//  TERRITÓRIOS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Territory {
    pub id: ResourceId,
    pub territory_name: String,
    // ID do vendedor responsável, gravado como texto pela tela
    pub territory_manager: Option<String>,
    pub region: Option<String>,
    pub territory_status: Option<TerritoryStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct TerritoryPayload {
    #[validate(custom(function = "not_blank"))]
    pub territory_name: String,

    #[validate(custom(function = "not_blank"))]
    pub territory_manager: String,

    #[validate(custom(function = "not_blank"))]
    pub region: String,

    #[validate(required(message = "This field is required."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub territory_status: Option<TerritoryStatus>,
}

impl CrossFieldRules for TerritoryPayload {}

pub struct Territories;

impl Resource for Territories {
    type Record = Territory;
    type Payload = TerritoryPayload;

    const PATH: &'static str = "territories";
    const LABEL: &'static str = "Territory";
    const PLURAL: &'static str = "territories";
    const SEARCH_FIELDS: &'static [&'static str] = &["territoryName", "region", "territoryManager"];

    fn id(record: &Territory) -> ResourceId {
        record.id.clone()
    }

    fn display_name(record: &Territory) -> String {
        record.territory_name.clone()
    }
}

// =============================================================================
//  CAMPANHAS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: ResourceId,
    pub name: String,
    pub campaign_type: Option<String>,
    pub status: Option<CampaignStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignPayload {
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[validate(custom(function = "not_negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Decimal>,
}

impl CrossFieldRules for CampaignPayload {
    fn check_cross_fields(&self, errors: &mut FieldErrors) {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                errors.insert("endDate", "The end date cannot be before the start date.");
            }
        }
    }
}

pub struct Campaigns;

impl Resource for Campaigns {
    type Record = Campaign;
    type Payload = CampaignPayload;

    const PATH: &'static str = "campaigns";
    const LABEL: &'static str = "Campaign";
    const PLURAL: &'static str = "campaigns";
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "campaignType"];

    fn id(record: &Campaign) -> ResourceId {
        record.id.clone()
    }

    fn display_name(record: &Campaign) -> String {
        record.name.clone()
    }
}

// =============================================================================
//  CONTATOS (com associações)
// =============================================================================

/// Alvo de uma associação, discriminado por `entityType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entityType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityRef {
    Lead {
        #[serde(rename = "entityId")]
        entity_id: ResourceId,
    },
    Opportunity {
        #[serde(rename = "entityId")]
        entity_id: ResourceId,
    },
    Customer {
        #[serde(rename = "entityId")]
        entity_id: ResourceId,
    },
    Account {
        #[serde(rename = "entityId")]
        entity_id: ResourceId,
    },
}

impl EntityRef {
    pub fn entity_id(&self) -> &ResourceId {
        match self {
            EntityRef::Lead { entity_id }
            | EntityRef::Opportunity { entity_id }
            | EntityRef::Customer { entity_id }
            | EntityRef::Account { entity_id } => entity_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    #[serde(flatten)]
    pub target: EntityRef,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ResourceId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    #[serde(default)]
    pub associations: Vec<Association>,
}

impl Contact {
    pub fn primary_association(&self) -> Option<&Association> {
        self.associations.iter().find(|a| a.is_primary)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactPayload {
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,

    #[validate(custom(function = "not_blank"))]
    pub last_name: String,

    #[validate(email(message = "Enter a valid email address."))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[validate(custom(function = "phone_format"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,

    #[serde(default)]
    pub associations: Vec<Association>,
}

impl CrossFieldRules for ContactPayload {
    fn check_cross_fields(&self, errors: &mut FieldErrors) {
        if self.associations.iter().filter(|a| a.is_primary).count() > 1 {
            errors.insert("associations", "Only one association can be primary.");
        }
    }
}

pub struct Contacts;

impl Resource for Contacts {
    type Record = Contact;
    type Payload = ContactPayload;

    const PATH: &'static str = "contacts";
    const LABEL: &'static str = "Contact";
    const PLURAL: &'static str = "contacts";
    const SEARCH_FIELDS: &'static [&'static str] = &["firstName", "lastName", "email", "jobTitle"];

    fn id(record: &Contact) -> ResourceId {
        record.id.clone()
    }

    fn display_name(record: &Contact) -> String {
        format!("{} {}", record.first_name, record.last_name).trim().to_string()
    }
}

// =============================================================================
//  VENDEDORES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Salesperson {
    pub id: ResourceId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub territory_id: Option<ResourceId>,
    pub commission_rate: Option<Decimal>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SalespersonPayload {
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[validate(
        required(message = "This field is required."),
        email(message = "Enter a valid email address.")
    )]
    pub email: Option<String>,

    #[validate(custom(function = "phone_format"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub territory_id: Option<ResourceId>,

    #[validate(custom(function = "percentage"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl CrossFieldRules for SalespersonPayload {}

pub struct Salespersons;

impl Resource for Salespersons {
    type Record = Salesperson;
    type Payload = SalespersonPayload;

    const PATH: &'static str = "salespersons";
    const LABEL: &'static str = "Salesperson";
    const PLURAL: &'static str = "salespersons";
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "email"];

    fn id(record: &Salesperson) -> ResourceId {
        record.id.clone()
    }

    fn display_name(record: &Salesperson) -> String {
        record.name.clone()
    }
}
