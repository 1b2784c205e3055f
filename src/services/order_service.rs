use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::{
    dto::orders::{CustomerRef, OrderLineView, OrderList, OrderView},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::Entity as Products,
        profiles::{Column as ProfileCol, Entity as Profiles},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderLine},
    response::{ApiResponse, Meta},
    services::or_empty,
    state::AppState,
};

/// Groups lines under their orders, keeping the order of `orders`.
///
/// `product_images` maps a product id to its current image; lines whose product has
/// been deleted keep their captured name and price but get no image. Orders get a
/// customer only when one is present in `customers`.
pub fn assemble_order_views(
    orders: Vec<Order>,
    lines: Vec<OrderLine>,
    product_images: &HashMap<Uuid, Option<String>>,
    customers: &HashMap<Uuid, CustomerRef>,
) -> Vec<OrderView> {
    let mut lines_by_order: HashMap<Uuid, Vec<OrderLineView>> = HashMap::new();
    for line in lines {
        let image_url = line
            .product_id
            .and_then(|id| product_images.get(&id).cloned().flatten());
        let line_total = line.line_total();
        lines_by_order
            .entry(line.order_id)
            .or_default()
            .push(OrderLineView {
                line,
                image_url,
                line_total,
            });
    }

    orders
        .into_iter()
        .map(|order| OrderView {
            items: lines_by_order.remove(&order.id).unwrap_or_default(),
            customer: customers.get(&order.user_id).cloned(),
            order,
        })
        .collect()
}

/// Loads lines (with current product images) and, optionally, customers for `orders`.
pub(crate) async fn load_order_views(
    orm: &DatabaseConnection,
    orders: Vec<OrderModel>,
    with_customers: bool,
) -> AppResult<Vec<OrderView>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .order_by_asc(OrderItemCol::CreatedAt)
        .find_also_related(Products)
        .all(orm)
        .await?;

    let mut product_images = HashMap::new();
    let mut lines = Vec::with_capacity(rows.len());
    for (item, product) in rows {
        if let Some(product) = product {
            product_images.insert(product.id, product.image_url);
        }
        lines.push(OrderLine::from(item));
    }

    let customers = if with_customers {
        let user_ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();
        Profiles::find()
            .filter(ProfileCol::Id.is_in(user_ids))
            .all(orm)
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
            .collect()
    } else {
        HashMap::new()
    };

    let orders = orders.into_iter().map(Order::from).collect();
    Ok(assemble_order_views(orders, lines, &product_images, &customers))
}

async fn fetch_account_orders(state: &AppState, user: &AuthUser) -> AppResult<Vec<OrderView>> {
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;
    load_order_views(&state.orm, orders, false).await
}

/// The caller's order history, newest first.
pub async fn list_account_orders(state: &AppState, user: &AuthUser) -> ApiResponse<OrderList> {
    let items = or_empty(fetch_account_orders(state, user).await, "account orders");
    let total = items.len() as i64;
    ApiResponse::success("Ok", OrderList { items }, Some(Meta::total(total)))
}

pub async fn get_account_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderView>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let view = load_order_views(&state.orm, vec![order], false)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("Order"))?;

    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}
