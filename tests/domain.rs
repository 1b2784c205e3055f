use std::collections::HashMap;
use std::str::FromStr;

use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use storefront_api::{
    dto::{
        advertisements::AdvertisementForm,
        cart::{CartItemDto, CartList},
        orders::CustomerRef,
        products::{ProductForm, ProductInput, normalize_optional, parse_price, parse_stock},
    },
    error::AppError,
    models::{
        Advertisement, Order, OrderLine, OrderStatus, Product, Profile, is_purchasable,
    },
    routes::params::Pagination,
    services::{
        catalog_service::like_pattern, invoice_service::fallback_invoice_number,
        order_service::assemble_order_views,
    },
};
use uuid::Uuid;

fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("decimal")
}

fn profile(role: &str, is_admin: bool) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        email: "someone@example.com".into(),
        full_name: None,
        role: role.into(),
        is_admin,
        created_at: Utc::now(),
    }
}

fn product(price: &str, stock: i32, is_active: bool) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: "Pink Salt 1kg".into(),
        description: None,
        price: dec(price),
        image_url: None,
        stock_quantity: stock,
        category: Some("salt".into()),
        is_active,
        created_at: Utc::now(),
        purchasable: is_purchasable(is_active, stock),
    }
}

fn order(user_id: Uuid) -> Order {
    Order {
        id: Uuid::new_v4(),
        user_id,
        status: OrderStatus::Pending,
        total_amount: Decimal::ZERO,
        shipping_address: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn line(order_id: Uuid, product_id: Option<Uuid>, quantity: i32, unit_price: &str) -> OrderLine {
    OrderLine {
        id: Uuid::new_v4(),
        order_id,
        product_id,
        product_name: "Sea Salt Flakes".into(),
        quantity,
        unit_price: dec(unit_price),
        created_at: Utc::now(),
    }
}

fn form(price: &str, stock: &str) -> ProductForm {
    ProductForm {
        name: "  Pink Salt 1kg ".into(),
        description: Some("   ".into()),
        price: price.into(),
        image_url: Some("".into()),
        stock_quantity: stock.into(),
        category: Some(" salt ".into()),
        is_active: true,
    }
}

fn ad(is_active: bool, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Advertisement {
    Advertisement {
        id: Uuid::new_v4(),
        title: "Salt season".into(),
        description: None,
        image_url: None,
        link_url: None,
        is_active,
        position: "banner".into(),
        start_date: start,
        end_date: end,
        created_at: Utc::now(),
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
}

#[test]
fn purchasable_requires_active_and_stock() {
    assert!(is_purchasable(true, 3));
    assert!(!is_purchasable(true, 0));
    assert!(!is_purchasable(false, 10));
    assert!(product("1.00", 1, true).is_purchasable());
    assert!(!product("1.00", 0, true).purchasable);
}

#[test]
fn admin_marker_is_role_or_flag() {
    assert!(profile("admin", false).is_admin());
    assert!(profile("customer", true).is_admin());
    assert!(!profile("customer", false).is_admin());
}

#[test]
fn order_status_follows_lifecycle() {
    use OrderStatus::*;

    assert!(Pending.can_transition_to(Processing));
    assert!(Pending.can_transition_to(Cancelled));
    assert!(Processing.can_transition_to(Shipped));
    assert!(Shipped.can_transition_to(Delivered));
    assert!(Shipped.can_transition_to(Shipped));

    assert!(!Pending.can_transition_to(Delivered));
    assert!(!Shipped.can_transition_to(Cancelled));
    assert!(!Delivered.can_transition_to(Pending));
    assert!(!Cancelled.can_transition_to(Processing));

    assert!(Delivered.is_terminal());
    assert!(Cancelled.is_terminal());
    assert!(!Processing.is_terminal());
}

#[test]
fn order_status_parses_case_insensitively() {
    assert_eq!(" Shipped ".parse::<OrderStatus>(), Ok(OrderStatus::Shipped));
    assert_eq!(OrderStatus::Cancelled.to_string(), "cancelled");
    assert!("refunded".parse::<OrderStatus>().is_err());

    let json = serde_json::to_value(OrderStatus::Processing).expect("json");
    assert_eq!(json, "processing");
}

#[test]
fn product_form_is_coerced() {
    let input = ProductInput::try_from(form("9.99", "50")).expect("valid form");
    assert_eq!(input.name, "Pink Salt 1kg");
    assert_eq!(input.price, dec("9.99"));
    assert_eq!(input.stock_quantity, 50);
    assert_eq!(input.description, None);
    assert_eq!(input.image_url, None);
    assert_eq!(input.category.as_deref(), Some("salt"));
}

#[test]
fn product_price_serializes_as_number() {
    let json = serde_json::to_value(product("9.99", 50, true)).expect("json");
    assert_eq!(json["price"], serde_json::json!(9.99));
    assert_eq!(json["stock_quantity"], 50);
    assert_eq!(json["purchasable"], true);
}

#[test]
fn product_form_rejects_bad_numbers() {
    assert!(matches!(
        ProductInput::try_from(form("abc", "1")),
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        ProductInput::try_from(form("1.00", "2.5")),
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(parse_price("-0.01"), Err(AppError::BadRequest(_))));
    assert!(matches!(parse_stock("-3"), Err(AppError::BadRequest(_))));
    assert_eq!(parse_price(" 4.505 ").expect("price"), dec("4.50"));
    assert_eq!(parse_stock(" 0 ").expect("stock"), 0);

    let mut nameless = form("1", "1");
    nameless.name = "   ".into();
    assert!(matches!(
        ProductInput::try_from(nameless),
        Err(AppError::BadRequest(msg)) if msg == "Product name is required"
    ));
}

#[test]
fn product_form_accepts_numbers_or_text() {
    let numeric: ProductForm = serde_json::from_value(serde_json::json!({
        "name": "Pink Salt 1kg",
        "price": 9.99,
        "stock_quantity": 50
    }))
    .expect("numeric form");
    assert_eq!(numeric.price, "9.99");
    assert_eq!(numeric.stock_quantity, "50");
    assert!(numeric.is_active);

    let input = ProductInput::try_from(numeric).expect("valid form");
    assert_eq!(input.price, dec("9.99"));
    assert_eq!(input.stock_quantity, 50);

    let textual: ProductForm = serde_json::from_value(serde_json::json!({
        "name": "Pink Salt 1kg",
        "price": " 9.99 ",
        "stock_quantity": "50"
    }))
    .expect("text form");
    assert_eq!(ProductInput::try_from(textual).expect("valid form").price, dec("9.99"));

    let fractional_stock: ProductForm = serde_json::from_value(serde_json::json!({
        "name": "Pink Salt 1kg",
        "price": 1,
        "stock_quantity": 2.5
    }))
    .expect("form");
    assert!(matches!(
        ProductInput::try_from(fractional_stock),
        Err(AppError::BadRequest(_))
    ));

    let boolean_price = serde_json::from_value::<ProductForm>(serde_json::json!({
        "name": "Pink Salt 1kg",
        "price": true,
        "stock_quantity": 1
    }));
    assert!(boolean_price.is_err());
}

#[test]
fn blank_optionals_become_none() {
    assert_eq!(normalize_optional(None), None);
    assert_eq!(normalize_optional(Some(" \t".into())), None);
    assert_eq!(normalize_optional(Some(" x ".into())), Some("x".into()));
}

#[test]
fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("salt"), "%salt%");
    assert_eq!(like_pattern(" 50%_off "), "%50\\%\\_off%");
}

#[test]
fn order_views_group_lines_and_keep_order() {
    let customer_id = Uuid::new_v4();
    let first = order(customer_id);
    let second = order(customer_id);
    let live_product = Uuid::new_v4();

    let lines = vec![
        line(second.id, Some(live_product), 2, "6.50"),
        line(first.id, None, 1, "9.99"),
        line(second.id, Some(Uuid::new_v4()), 3, "1.00"),
    ];
    let images = HashMap::from([(live_product, Some("/img/flakes.png".to_string()))]);
    let customers = HashMap::from([(
        customer_id,
        CustomerRef {
            id: customer_id,
            full_name: Some("Sample Customer".into()),
            email: "customer@example.com".into(),
        },
    )]);

    let views = assemble_order_views(vec![first.clone(), second.clone()], lines, &images, &customers);

    assert_eq!(views.len(), 2);
    assert_eq!(views[0].order.id, first.id);
    assert_eq!(views[0].items.len(), 1);
    assert_eq!(views[0].items[0].image_url, None);
    assert_eq!(views[1].items.len(), 2);
    assert_eq!(views[1].items[0].image_url.as_deref(), Some("/img/flakes.png"));
    assert_eq!(views[1].items[0].line_total, dec("13.00"));
    assert!(views[1].customer.is_some());

    let without_customers = assemble_order_views(vec![first], Vec::new(), &images, &HashMap::new());
    assert!(without_customers[0].items.is_empty());
    assert!(without_customers[0].customer.is_none());
}

#[test]
fn advertisement_window_is_inclusive() {
    let today = day(2026, 3, 10);
    assert!(ad(true, None, None).is_live_on(today));
    assert!(ad(true, Some(today), Some(today)).is_live_on(today));
    assert!(!ad(true, Some(day(2026, 3, 11)), None).is_live_on(today));
    assert!(!ad(true, None, Some(day(2026, 3, 9))).is_live_on(today));
    assert!(!ad(false, None, None).is_live_on(today));
}

#[test]
fn advertisement_form_validation() {
    let valid = AdvertisementForm {
        title: " Salt season ".into(),
        description: Some(" ".into()),
        image_url: None,
        link_url: None,
        is_active: true,
        position: None,
        start_date: Some(day(2026, 1, 1)),
        end_date: Some(day(2026, 1, 31)),
    };
    let cleaned = valid.clone().validate().expect("valid");
    assert_eq!(cleaned.title, "Salt season");
    assert_eq!(cleaned.description, None);
    assert_eq!(cleaned.position.as_deref(), Some("banner"));

    let mut reversed = valid.clone();
    reversed.end_date = Some(day(2025, 12, 31));
    assert!(matches!(reversed.validate(), Err(AppError::BadRequest(_))));

    let mut untitled = valid;
    untitled.title = "".into();
    assert!(matches!(untitled.validate(), Err(AppError::BadRequest(_))));
}

#[test]
fn pagination_is_clamped() {
    let default = Pagination::default().normalize();
    assert_eq!(default, (1, 20, 0));

    let wild = Pagination {
        page: Some(-4),
        per_page: Some(1000),
    }
    .normalize();
    assert_eq!(wild, (1, 100, 0));

    let third = Pagination {
        page: Some(3),
        per_page: Some(10),
    }
    .normalize();
    assert_eq!(third, (3, 10, 20));

    let huge = Pagination {
        page: Some(i64::MAX),
        per_page: Some(20),
    }
    .normalize();
    assert_eq!(huge, (i64::MAX, 20, i64::MAX));
}

#[test]
fn cart_subtotal_sums_lines() {
    let items = vec![
        CartItemDto {
            id: Uuid::new_v4(),
            product: product("9.99", 50, true),
            quantity: 2,
            line_total: dec("19.98"),
        },
        CartItemDto {
            id: Uuid::new_v4(),
            product: product("0.02", 5, true),
            quantity: 1,
            line_total: dec("0.02"),
        },
    ];
    assert_eq!(CartList::new(items).subtotal, dec("20.00"));
    assert_eq!(CartList::new(Vec::new()).subtotal, Decimal::ZERO);
}

#[test]
fn error_statuses() {
    assert_eq!(
        AppError::login_required("Please login").status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::Forbidden.to_string(), "Unauthorized");
    assert_eq!(AppError::not_found("Product").to_string(), "Product not found");
    assert_eq!(
        AppError::Conflict("Item already in wishlist".into()).status(),
        StatusCode::CONFLICT
    );

    let illegal = AppError::IllegalTransition {
        from: OrderStatus::Pending,
        to: OrderStatus::Delivered,
    };
    assert_eq!(illegal.status(), StatusCode::CONFLICT);
    assert_eq!(illegal.to_string(), "Cannot move order from pending to delivered");
}

#[test]
fn fallback_invoice_number_uses_millis() {
    assert_eq!(fallback_invoice_number(1_700_000_000_123), "INV-1700000000123");
}
