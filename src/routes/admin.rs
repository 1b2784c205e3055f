use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::{DashboardStats, InvoiceList},
        advertisements::{AdvertisementForm, AdvertisementList},
        orders::{OrderList, OrderStatusChange, UpdateOrderStatusRequest},
        products::{ProductForm, ProductList, ProductSaved},
    },
    error::AppResult,
    middleware::auth::AdminUser,
    models::{Advertisement, Invoice},
    response::ApiResponse,
    routes::params::{OrderListQuery, Pagination},
    services::{admin_service, advertisement_service, invoice_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/products", get(list_inventory).post(create_product))
        .route("/products/{id}", put(update_product))
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/orders/{id}/invoice", post(generate_invoice))
        .route("/invoices", get(list_invoices))
        .route(
            "/advertisements",
            get(list_advertisements).post(create_advertisement),
        )
        .route("/advertisements/{id}/toggle", patch(toggle_advertisement))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Counts and recent orders", body = ApiResponse<DashboardStats>),
        (status = 403, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    AdminUser { user, .. }: AdminUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let resp = admin_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "All products including inactive", body = ApiResponse<ProductList>),
        (status = 403, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    AdminUser { user, .. }: AdminUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = admin_service::list_inventory(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = ProductForm,
    responses(
        (status = 200, description = "Product created", body = ApiResponse<ProductSaved>),
        (status = 400, description = "Invalid form or constraint violation"),
        (status = 403, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser { user, .. }: AdminUser,
    Json(form): Json<ProductForm>,
) -> AppResult<Json<ApiResponse<ProductSaved>>> {
    let resp = admin_service::create_product(&state, &user, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = ProductForm,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductSaved>),
        (status = 400, description = "Invalid form or constraint violation"),
        (status = 403, description = "Unauthorized"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser { user, .. }: AdminUser,
    Path(id): Path<Uuid>,
    Json(form): Json<ProductForm>,
) -> AppResult<Json<ApiResponse<ProductSaved>>> {
    let resp = admin_service::update_product(&state, &user, id, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "All orders with customer and lines", body = ApiResponse<OrderList>),
        (status = 403, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    AdminUser { user, .. }: AdminUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = admin_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<OrderStatusChange>),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Unauthorized"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    AdminUser { user, .. }: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderStatusChange>>> {
    let resp = admin_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{id}/invoice",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Invoice record created", body = ApiResponse<Invoice>),
        (status = 403, description = "Unauthorized"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn generate_invoice(
    State(state): State<AppState>,
    AdminUser { user, .. }: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Invoice>>> {
    let resp = invoice_service::generate_invoice(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/invoices",
    responses(
        (status = 200, description = "All invoices, newest first", body = ApiResponse<InvoiceList>),
        (status = 403, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    AdminUser { user, .. }: AdminUser,
) -> AppResult<Json<ApiResponse<InvoiceList>>> {
    let resp = invoice_service::list_invoices(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/advertisements",
    responses(
        (status = 200, description = "Every advertisement", body = ApiResponse<AdvertisementList>),
        (status = 403, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_advertisements(
    State(state): State<AppState>,
    AdminUser { user, .. }: AdminUser,
) -> AppResult<Json<ApiResponse<AdvertisementList>>> {
    let resp = advertisement_service::list_advertisements(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/advertisements",
    request_body = AdvertisementForm,
    responses(
        (status = 200, description = "Advertisement created", body = ApiResponse<Advertisement>),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_advertisement(
    State(state): State<AppState>,
    AdminUser { user, .. }: AdminUser,
    Json(form): Json<AdvertisementForm>,
) -> AppResult<Json<ApiResponse<Advertisement>>> {
    let resp = advertisement_service::create_advertisement(&state, &user, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/advertisements/{id}/toggle",
    params(
        ("id" = Uuid, Path, description = "Advertisement ID")
    ),
    responses(
        (status = 200, description = "Active flag flipped", body = ApiResponse<Advertisement>),
        (status = 403, description = "Unauthorized"),
        (status = 404, description = "Advertisement not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn toggle_advertisement(
    State(state): State<AppState>,
    AdminUser { user, .. }: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Advertisement>>> {
    let resp = advertisement_service::toggle_advertisement(&state, &user, id).await?;
    Ok(Json(resp))
}
