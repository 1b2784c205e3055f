use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        admin::DashboardStats,
        orders::{OrderList, OrderStatusChange, UpdateOrderStatusRequest},
        products::{ProductForm, ProductInput, ProductList, ProductSaved},
    },
    entity::{
        advertisements::Entity as Advertisements,
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderStatus, Product},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, Pagination, SortOrder},
    services::order_service::load_order_views,
    state::AppState,
};

pub const RECENT_ORDERS: u64 = 5;

/// Every product, active or not, for the inventory screen.
pub async fn list_inventory(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(state, user).await?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Products::find().order_by_desc(ProdCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success(
        "Inventory",
        ProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    form: ProductForm,
) -> AppResult<ApiResponse<ProductSaved>> {
    ensure_admin(state, user).await?;
    let input = ProductInput::try_from(form)?;

    let active = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        description: Set(input.description),
        price: Set(input.price),
        image_url: Set(input.image_url),
        stock_quantity: Set(input.stock_quantity),
        category: Set(input.category),
        is_active: Set(input.is_active),
        created_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    tracing::info!(product_id = %product.id, admin_id = %user.user_id, "product created");
    audit::record(
        &state.pool,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        ProductSaved {
            product: Product::from(product),
        },
        Some(Meta::empty()),
    ))
}

/// Replaces every editable field of the product with the submitted form.
pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    form: ProductForm,
) -> AppResult<ApiResponse<ProductSaved>> {
    ensure_admin(state, user).await?;
    let input = ProductInput::try_from(form)?;

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let mut active: ProductActive = existing.into();
    active.name = Set(input.name);
    active.description = Set(input.description);
    active.price = Set(input.price);
    active.image_url = Set(input.image_url);
    active.stock_quantity = Set(input.stock_quantity);
    active.category = Set(input.category);
    active.is_active = Set(input.is_active);
    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        ProductSaved {
            product: Product::from(product),
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(state, user).await?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status = status
            .parse::<OrderStatus>()
            .map_err(|_| AppError::BadRequest("Invalid order status".into()))?;
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = load_order_views(&state.orm, orders, true).await?;
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Moves an order along its lifecycle. The current status is read under a row lock
/// and the move must be allowed by [`OrderStatus::can_transition_to`].
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderStatusChange>> {
    ensure_admin(state, user).await?;
    let next = payload
        .status
        .parse::<OrderStatus>()
        .map_err(|_| AppError::BadRequest("Invalid order status".into()))?;

    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let previous = existing.status;
    if !previous.can_transition_to(next) {
        return Err(AppError::IllegalTransition {
            from: previous,
            to: next,
        });
    }

    let order = if previous == next {
        existing
    } else {
        let mut active: OrderActive = existing.into();
        active.status = Set(next);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?
    };
    txn.commit().await?;

    if previous != next {
        tracing::info!(order_id = %order.id, from = %previous, to = %next, "order status changed");
        audit::record(
            &state.pool,
            user.user_id,
            "order_status_update",
            "orders",
            serde_json::json!({ "order_id": order.id, "from": previous, "to": next }),
        )
        .await;
    }

    Ok(ApiResponse::success(
        "Order updated",
        OrderStatusChange {
            order: Order::from(order),
            previous_status: previous,
            allowed_next: next.next_statuses().to_vec(),
        },
        Some(Meta::empty()),
    ))
}

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_admin(state, user).await?;

    let (orders_count, products_count, advertisements_count) = tokio::join!(
        Orders::find().count(&state.orm),
        Products::find().count(&state.orm),
        Advertisements::find().count(&state.orm),
    );

    let recent = Orders::find()
        .order_by_desc(OrderCol::CreatedAt)
        .limit(RECENT_ORDERS)
        .all(&state.orm)
        .await?;
    let recent_orders = load_order_views(&state.orm, recent, true).await?;

    Ok(ApiResponse::success(
        "Dashboard",
        DashboardStats {
            orders_count: orders_count? as i64,
            products_count: products_count? as i64,
            advertisements_count: advertisements_count? as i64,
            recent_orders,
        },
        Some(Meta::empty()),
    ))
}
