use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use agora_core::health::{healthz, readyz};
use agora_core::middleware::request_id_layer;

use crate::handlers::{
    auth::{login, logout, me, refresh, register},
    cart::{add_cart_line, get_my_cart, list_carts, remove_cart_line, update_cart_line},
    category::{create_category, delete_category, get_category, list_categories, update_category},
    order::{checkout, get_order, list_orders, update_order},
    product::{create_product, delete_product, get_product, list_products, update_product},
    shipment::{create_shipment, get_shipment, list_shipments, update_shipment},
    upgrade::{
        approve_upgrade_request, create_upgrade_request, get_upgrade_request,
        list_upgrade_requests, reject_upgrade_request,
    },
    user::{list_users, unverify_user, verify_user},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/token", post(login))
        .route("/auth/token/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        // Users
        .route("/users", get(list_users))
        .route("/users/{id}/verify", post(verify_user))
        .route("/users/{id}/unverify", post(unverify_user))
        // Categories
        .route("/categories", get(list_categories))
        .route("/categories", post(create_category))
        .route("/categories/{id}", get(get_category))
        .route("/categories/{id}", patch(update_category))
        .route("/categories/{id}", delete(delete_category))
        // Products
        .route("/products", get(list_products))
        .route("/products", post(create_product))
        .route("/products/{id}", get(get_product))
        .route("/products/{id}", patch(update_product))
        .route("/products/{id}", delete(delete_product))
        // Carts
        .route("/carts", get(list_carts))
        .route("/carts/@me", get(get_my_cart))
        .route("/carts/@me/lines", post(add_cart_line))
        .route("/carts/@me/lines/{id}", patch(update_cart_line))
        .route("/carts/@me/lines/{id}", delete(remove_cart_line))
        // Orders
        .route("/orders", get(list_orders))
        .route("/orders", post(checkout))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}", patch(update_order))
        // Shipments
        .route("/shipments", get(list_shipments))
        .route("/shipments", post(create_shipment))
        .route("/shipments/{id}", get(get_shipment))
        .route("/shipments/{id}", patch(update_shipment))
        // Upgrade requests
        .route("/upgrade-requests", get(list_upgrade_requests))
        .route("/upgrade-requests", post(create_upgrade_request))
        .route("/upgrade-requests/{id}", get(get_upgrade_request))
        .route("/upgrade-requests/{id}/approve", post(approve_upgrade_request))
        .route("/upgrade-requests/{id}/reject", post(reject_upgrade_request))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
