use actix_web::{web, HttpResponse, Result as ActixResult};
use shared_types::{ActionResponse, FormField, Notice, UpdateFieldRequest, UpdatePhotoRequest};
use std::sync::Arc;

use crate::form::FormController;

fn action_response(controller: &FormController, notice: Notice) -> ActionResponse {
    ActionResponse {
        notice,
        artifact: None,
        form: controller.snapshot(),
    }
}

pub async fn get_form(controller: web::Data<Arc<FormController>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(controller.snapshot()))
}

/// Ignored edits (address while a lookup runs) still answer with the
/// current snapshot so the client can resync.
pub async fn update_field(
    controller: web::Data<Arc<FormController>>,
    path: web::Path<FormField>,
    request: web::Json<UpdateFieldRequest>,
) -> ActixResult<HttpResponse> {
    let field = path.into_inner();

    if !controller.apply_edit(field, &request.value) {
        tracing::debug!("Edit to {} ignored while busy", field);
    }

    Ok(HttpResponse::Ok().json(controller.snapshot()))
}

pub async fn set_photo(
    controller: web::Data<Arc<FormController>>,
    request: web::Json<UpdatePhotoRequest>,
) -> ActixResult<HttpResponse> {
    let notice = controller.set_photo(&request.data_uri);

    Ok(HttpResponse::Ok().json(action_response(&controller, notice)))
}

pub async fn remove_photo(controller: web::Data<Arc<FormController>>) -> ActixResult<HttpResponse> {
    let notice = controller.remove_photo();

    Ok(HttpResponse::Ok().json(action_response(&controller, notice)))
}

pub async fn lookup_postal_code(
    controller: web::Data<Arc<FormController>>,
) -> ActixResult<HttpResponse> {
    let outcome = controller.lookup_postal_code().await;

    Ok(HttpResponse::Ok().json(action_response(&controller, outcome.notice())))
}

pub async fn submit_form(controller: web::Data<Arc<FormController>>) -> ActixResult<HttpResponse> {
    let outcome = controller.submit().await;

    let mut response = action_response(&controller, outcome.notice());
    response.artifact = outcome.receipt().cloned();

    Ok(HttpResponse::Ok().json(response))
}
