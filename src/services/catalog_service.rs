use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::products::{CategoryList, ProductList},
    entity::products::{Column, Entity as Products},
    error::{AppError, AppResult},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::or_empty,
    state::AppState,
};

/// Wrap a search term for ILIKE, escaping the pattern metacharacters.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn storefront_condition(query: &ProductQuery) -> Condition {
    let mut condition = Condition::all().add(Column::IsActive.eq(true));

    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(category) = query.category.as_ref().filter(|c| !c.trim().is_empty()) {
        condition = condition.add(Column::Category.eq(category.trim()));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    if query.in_stock == Some(true) {
        condition = condition.add(Column::StockQuantity.gt(0));
    }

    condition
}

async fn fetch_catalog(
    state: &AppState,
    query: &ProductQuery,
    limit: i64,
    offset: i64,
) -> AppResult<(Vec<Product>, i64)> {
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match query.sort_by.unwrap_or(ProductSortBy::CreatedAt) {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(storefront_condition(query));
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok((items, total))
}

/// Active products for the storefront. A failed read yields an empty page.
pub async fn list_products(state: &AppState, query: ProductQuery) -> ApiResponse<ProductList> {
    let (page, limit, offset) = query.pagination().normalize();
    let (items, total) = match fetch_catalog(state, &query, limit, offset).await {
        Ok(found) => found,
        Err(err) => {
            tracing::error!(error = ?err, "error fetching products");
            (Vec::new(), 0)
        }
    };

    let meta = Meta::new(page, limit, total);
    ApiResponse::success("Products", ProductList { items }, Some(meta))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .filter(Column::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .map(Product::from)
        .ok_or_else(|| AppError::not_found("Product"))?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn list_categories(state: &AppState) -> ApiResponse<CategoryList> {
    let categories = Products::find()
        .select_only()
        .column(Column::Category)
        .distinct()
        .filter(Column::IsActive.eq(true))
        .filter(Column::Category.is_not_null())
        .order_by_asc(Column::Category)
        .into_tuple::<String>()
        .all(&state.orm)
        .await
        .map_err(AppError::from);

    let items = or_empty(categories, "categories");
    ApiResponse::success("Categories", CategoryList { items }, None)
}
