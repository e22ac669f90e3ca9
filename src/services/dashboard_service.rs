// src/services/dashboard_service.rs

use serde::Serialize;

use crate::{
    client::{http::ResourceClient, resource::Resource},
    models::{
        crm::{Campaigns, Contacts, Customers, Leads, Opportunities, Salespersons, Territories},
        inventory::InventoryItems,
        query::ListQuery,
        sales::{DeliveryNotes, Invoices, Payments, SalesOrders},
    },
};

/// Um cartão do painel inicial: quantos registros existem de um recurso.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCard {
    pub resource: &'static str,
    pub label: &'static str,
    /// `None` quando o backend não respondeu para este recurso.
    pub total: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardOverview {
    pub cards: Vec<StatCard>,
}

impl DashboardOverview {
    pub fn card(&self, resource: &str) -> Option<&StatCard> {
        self.cards.iter().find(|c| c.resource == resource)
    }

    /// Quantos cartões conseguiram carregar.
    pub fn loaded(&self) -> usize {
        self.cards.iter().filter(|c| c.total.is_some()).count()
    }
}

#[derive(Clone)]
pub struct DashboardService {
    client: ResourceClient,
}

impl DashboardService {
    pub fn new(client: ResourceClient) -> Self {
        Self { client }
    }

    /// Busca os totais de todos os recursos em paralelo.
    /// Um recurso que falha vira cartão vazio; os outros seguem normalmente.
    pub async fn overview(&self) -> DashboardOverview {
        let (leads, opportunities, customers, contacts, territories, salespersons) = tokio::join!(
            self.count::<Leads>(),
            self.count::<Opportunities>(),
            self.count::<Customers>(),
            self.count::<Contacts>(),
            self.count::<Territories>(),
            self.count::<Salespersons>(),
        );
        let (campaigns, items, orders, invoices, deliveries, payments) = tokio::join!(
            self.count::<Campaigns>(),
            self.count::<InventoryItems>(),
            self.count::<SalesOrders>(),
            self.count::<Invoices>(),
            self.count::<DeliveryNotes>(),
            self.count::<Payments>(),
        );

        DashboardOverview {
            cards: vec![
                leads,
                opportunities,
                customers,
                contacts,
                territories,
                salespersons,
                campaigns,
                items,
                orders,
                invoices,
                deliveries,
                payments,
            ],
        }
    }

    // Página 0 com tamanho 1: só interessa o totalElements
    async fn count<R: Resource>(&self) -> StatCard {
        let total = match self.client.list::<R>(&ListQuery::new(0, 1)).await {
            Ok(page) => Some(page.total_elements),
            Err(e) => {
                tracing::warn!(recurso = R::PATH, "total indisponível: {}", e);
                None
            }
        };
        StatCard { resource: R::PATH, label: R::PLURAL, total }
    }
}
