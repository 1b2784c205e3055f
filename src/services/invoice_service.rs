use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    dto::{
        admin::{InvoiceList, InvoiceView},
        orders::CustomerRef,
    },
    entity::{
        invoices::{ActiveModel as InvoiceActive, Column as InvoiceCol, Entity as Invoices},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders},
        profiles::{Column as ProfileCol, Entity as Profiles},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Invoice, Order},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn fallback_invoice_number(now_millis: i64) -> String {
    format!("INV-{now_millis}")
}

/// Ask the store for the next invoice number, falling back to a timestamp.
async fn next_invoice_number(pool: &DbPool) -> String {
    let generated: Result<(Option<String>,), sqlx::Error> =
        sqlx::query_as("SELECT generate_invoice_number()")
            .fetch_one(pool)
            .await;

    match generated {
        Ok((Some(number),)) if !number.is_empty() => number,
        Ok(_) => fallback_invoice_number(Utc::now().timestamp_millis()),
        Err(err) => {
            tracing::warn!(error = %err, "generate_invoice_number failed, using fallback");
            fallback_invoice_number(Utc::now().timestamp_millis())
        }
    }
}

/// Records an invoice for the order. No document is rendered, so `pdf_url` stays empty.
/// Calling this again for the same order issues another invoice.
pub async fn generate_invoice(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<Invoice>> {
    ensure_admin(state, user).await?;

    let order = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    let line_count = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .count(&state.orm)
        .await?;

    let invoice_number = next_invoice_number(&state.pool).await;
    let invoice = InvoiceActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        invoice_number: Set(invoice_number),
        pdf_url: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(
        order_id = %order.id,
        invoice_number = %invoice.invoice_number,
        lines = line_count,
        "invoice generated"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "invoice_generate",
        "invoices",
        serde_json::json!({ "order_id": order.id, "invoice_id": invoice.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Invoice generated",
        Invoice::from(invoice),
        Some(Meta::empty()),
    ))
}

pub async fn list_invoices(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<InvoiceList>> {
    ensure_admin(state, user).await?;

    let invoices = Invoices::find()
        .order_by_desc(InvoiceCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let order_ids: Vec<Uuid> = invoices.iter().map(|i| i.order_id).collect();
    let orders: HashMap<Uuid, Order> = Orders::find()
        .filter(OrderCol::Id.is_in(order_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|o| (o.id, Order::from(o)))
        .collect();

    let user_ids: Vec<Uuid> = orders.values().map(|o| o.user_id).collect();
    let customers: HashMap<Uuid, CustomerRef> = Profiles::find()
        .filter(ProfileCol::Id.is_in(user_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| {
            (
                p.id,
                CustomerRef {
                    id: p.id,
                    full_name: p.full_name,
                    email: p.email,
                },
            )
        })
        .collect();

    let items: Vec<InvoiceView> = invoices
        .into_iter()
        .map(|invoice| {
            let order = orders.get(&invoice.order_id).cloned();
            let customer = order
                .as_ref()
                .and_then(|o| customers.get(&o.user_id).cloned());
            InvoiceView {
                invoice: Invoice::from(invoice),
                order,
                customer,
            }
        })
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Invoices",
        InvoiceList { items },
        Some(Meta::total(total)),
    ))
}
