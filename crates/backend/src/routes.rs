use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // A001 Organization handlers
        // ========================================
        .route(
            "/api/organization",
            get(handlers::a001_organization::list_all).post(handlers::a001_organization::upsert),
        )
        .route(
            "/api/organization/:id",
            get(handlers::a001_organization::get_by_id)
                .delete(handlers::a001_organization::delete),
        )
        .route(
            "/api/organization/testdata",
            post(handlers::a001_organization::insert_test_data),
        )
        // ========================================
        // A002 Warehouse handlers
        // ========================================
        .route(
            "/api/warehouse",
            get(handlers::a002_warehouse::list_all).post(handlers::a002_warehouse::upsert),
        )
        .route(
            "/api/warehouse/:id",
            get(handlers::a002_warehouse::get_by_id).delete(handlers::a002_warehouse::delete),
        )
        // ========================================
        // A003 Supplier handlers
        // ========================================
        .route(
            "/api/supplier",
            get(handlers::a003_supplier::list_all).post(handlers::a003_supplier::upsert),
        )
        .route(
            "/api/supplier/:id",
            get(handlers::a003_supplier::get_by_id).delete(handlers::a003_supplier::delete),
        )
        .route(
            "/api/supplier/:id/block",
            post(handlers::a003_supplier::block),
        )
        .route(
            "/api/supplier/:id/unblock",
            post(handlers::a003_supplier::unblock),
        )
        // ========================================
        // A004 Nomenclature handlers
        // ========================================
        .route(
            "/api/nomenclature",
            get(handlers::a004_nomenclature::list_all).post(handlers::a004_nomenclature::upsert),
        )
        .route(
            "/api/nomenclature/search",
            get(handlers::a004_nomenclature::search_by_article),
        )
        .route(
            "/api/nomenclature/:id",
            get(handlers::a004_nomenclature::get_by_id)
                .delete(handlers::a004_nomenclature::delete),
        )
        // ========================================
        // A005 Purchase order handlers
        // ========================================
        .route(
            "/api/purchase-order",
            get(handlers::a005_purchase_order::list_all)
                .post(handlers::a005_purchase_order::upsert),
        )
        .route(
            "/api/purchase-order/:id",
            get(handlers::a005_purchase_order::get_by_id)
                .delete(handlers::a005_purchase_order::delete),
        )
        .route(
            "/api/purchase-order/:id/state",
            post(handlers::a005_purchase_order::set_state),
        )
        // ========================================
        // A006 Goods receipt handlers (документ с нумерацией)
        // ========================================
        .route(
            "/api/goods-receipt",
            get(handlers::a006_goods_receipt::list_all)
                .post(handlers::a006_goods_receipt::create),
        )
        .route(
            "/api/goods-receipt/:id",
            get(handlers::a006_goods_receipt::get_by_id),
        )
        .route(
            "/api/goods-receipt/:id/post",
            post(handlers::a006_goods_receipt::post_document),
        )
        .route(
            "/api/goods-receipt/:id/unpost",
            post(handlers::a006_goods_receipt::unpost_document),
        )
        .route(
            "/api/goods-receipt/:id/audit",
            get(handlers::a006_goods_receipt::audit_trail),
        )
        // ========================================
        // A007 Receipt policy handlers
        // ========================================
        .route(
            "/api/receipt-policy/:organization_id",
            get(handlers::a007_receipt_policy::get_for_organization)
                .put(handlers::a007_receipt_policy::save),
        )
        // ========================================
        // Invoice inbox handlers (внешнее хранилище входящих счетов)
        // ========================================
        .route(
            "/api/invoice-inbox",
            post(handlers::invoice_inbox::register),
        )
        .route(
            "/api/invoice-inbox/:ref",
            get(handlers::invoice_inbox::get_by_ref),
        )
        // ========================================
        // Logs handlers
        // ========================================
        .route(
            "/api/logs",
            get(handlers::logs::list_all)
                .post(handlers::logs::create)
                .delete(handlers::logs::clear_all),
        )
}
