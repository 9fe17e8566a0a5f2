use actix_web::{web, HttpResponse, Result as ActixResult};
use serde::Deserialize;
use std::sync::Arc;

use crate::jobs::ConnectivityMonitor;

pub async fn get_network_status(
    monitor: web::Data<Arc<ConnectivityMonitor>>,
) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(monitor.status()))
}

#[derive(Deserialize)]
pub struct FeatureQuery {
    #[serde(default = "default_requires_internet")]
    requires_internet: bool,
}

fn default_requires_internet() -> bool {
    true
}

pub async fn get_feature_availability(
    monitor: web::Data<Arc<ConnectivityMonitor>>,
    query: web::Query<FeatureQuery>,
) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(monitor.feature_availability(query.requires_internet)))
}
