use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{DashboardStats, InvoiceList, InvoiceView},
        advertisements::{AdvertisementForm, AdvertisementList},
        auth::{LoginRequest, LoginResponse, MeResponse, RegisterRequest},
        cart::{
            AddToCartRequest, BadgeCounts, CartItemDto, CartList, CartMutation, CountResponse,
            UpdateCartQuantityRequest,
        },
        orders::{CustomerRef, OrderLineView, OrderList, OrderStatusChange, OrderView, UpdateOrderStatusRequest},
        products::{CategoryList, ProductForm, ProductList, ProductSaved},
        wishlist::{AddToWishlistRequest, WishlistIds, WishlistItemDto, WishlistList, WishlistMutation},
    },
    models::{
        Advertisement, CartLine, Invoice, Order, OrderLine, OrderStatus, Product, Profile,
    },
    response::{ApiResponse, Meta},
    routes::{
        account, admin, advertisements, auth, badges, cart, health, params, products, wishlist,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::current_user,
        products::list_products,
        products::list_categories,
        products::get_product,
        advertisements::list_active,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        cart::cart_count,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        wishlist::wishlist_ids,
        wishlist::wishlist_count,
        badges::badge_counts,
        account::list_orders,
        account::get_order,
        admin::dashboard,
        admin::list_inventory,
        admin::create_product,
        admin::update_product,
        admin::list_all_orders,
        admin::update_order_status,
        admin::generate_invoice,
        admin::list_invoices,
        admin::list_advertisements,
        admin::create_advertisement,
        admin::toggle_advertisement
    ),
    components(
        schemas(
            Profile,
            Product,
            CartLine,
                Order,
            OrderLine,
            OrderStatus,
            Invoice,
            Advertisement,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            MeResponse,
            AddToCartRequest,
            UpdateCartQuantityRequest,
            CartItemDto,
            CartList,
            CartMutation,
            CountResponse,
            BadgeCounts,
            AddToWishlistRequest,
            WishlistItemDto,
            WishlistList,
            WishlistMutation,
            WishlistIds,
            CustomerRef,
            OrderLineView,
            OrderView,
            OrderList,
            UpdateOrderStatusRequest,
            OrderStatusChange,
            ProductForm,
            ProductList,
            CategoryList,
            ProductSaved,
            DashboardStats,
            InvoiceView,
            InvoiceList,
            AdvertisementForm,
            AdvertisementList,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartList>,
            ApiResponse<CartMutation>,
            ApiResponse<OrderList>,
            ApiResponse<OrderStatusChange>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and current user"),
        (name = "Products", description = "Public catalog"),
        (name = "Advertisements", description = "Storefront banners"),
        (name = "Cart", description = "Cart endpoints and navigation badges"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Account", description = "Customer order history"),
        (name = "Admin", description = "Back-office endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
