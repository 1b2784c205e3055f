use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::orders::{CustomerRef, OrderView},
    models::{Invoice, Order},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub orders_count: i64,
    pub products_count: i64,
    pub advertisements_count: i64,
    pub recent_orders: Vec<OrderView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceView {
    pub invoice: Invoice,
    pub order: Option<Order>,
    pub customer: Option<CustomerRef>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct InvoiceList {
    #[schema(value_type = Vec<InvoiceView>)]
    pub items: Vec<InvoiceView>,
}
