use axum::{
    routing::{get, patch},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use super::controller;

pub fn monitor_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(controller::get_status))
        .route("/insights", get(controller::get_insights))
        .route(
            "/endpoints",
            get(controller::list_endpoints)
                .post(controller::add_endpoint)
                .delete(controller::remove_endpoint),
        )
        .route(
            "/monitors",
            get(controller::list_monitors).post(controller::create_monitor),
        )
        .route(
            "/monitors/{id}",
            patch(controller::update_monitor).delete(controller::delete_monitor),
        )
        .route("/results", get(controller::get_results))
}
