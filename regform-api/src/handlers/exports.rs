use actix_web::{web, HttpResponse, Result as ActixResult};
use shared_types::ErrorResponse;
use std::sync::Arc;

use crate::export::DownloadStore;

/// Serves a document kept for the browser target. Each document downloads once.
pub async fn download_export(
    store: Option<web::Data<Arc<DownloadStore>>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let file_name = path.into_inner();

    let Some(store) = store else {
        return Ok(not_found("Downloads are not enabled for this export target"));
    };

    let Some(bytes) = store.take(&file_name) else {
        return Ok(not_found("Document not found"));
    };

    tracing::info!("Serving {} ({} bytes)", file_name, bytes.len());

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", file_name),
        ))
        .body(bytes))
}

fn not_found(message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        error: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::PdfExporter;
    use crate::form::FormController;
    use crate::handlers::form::{get_form, submit_form, update_field};
    use crate::integrations::{AddressDirectory, LookupError, ViaCepAddress};
    use actix_web::{test, App};
    use async_trait::async_trait;
    use serde_json::json;
    use shared_types::{ActionResponse, FormSnapshot, FormState};

    struct OfflineDirectory;

    #[async_trait]
    impl AddressDirectory for OfflineDirectory {
        async fn find(&self, _postal_code_digits: &str) -> Result<Option<ViaCepAddress>, LookupError> {
            Err(LookupError::Transport("offline".to_string()))
        }
    }

    fn browser_app_state() -> (Arc<FormController>, Arc<DownloadStore>) {
        let store = Arc::new(DownloadStore::new());
        let exporter = Arc::new(PdfExporter::new(store.clone(), "%d/%m/%Y, %H:%M:%S"));
        let controller = Arc::new(FormController::new(Arc::new(OfflineDirectory), exporter));
        (controller, store)
    }

    #[actix_web::test]
    async fn test_submit_then_download_once() {
        let (controller, store) = browser_app_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(controller.clone()))
                .app_data(web::Data::new(store.clone()))
                .route("/api/form", web::get().to(get_form))
                .route("/api/form/fields/{field}", web::put().to(update_field))
                .route("/api/form/submit", web::post().to(submit_form))
                .route("/api/exports/{file_name}", web::get().to(download_export)),
        )
        .await;

        for (field, value) in [("name", "Ana"), ("email", "a@a.com"), ("phone", "11999998888")] {
            let req = test::TestRequest::put()
                .uri(&format!("/api/form/fields/{}", field))
                .set_json(json!({ "value": value }))
                .to_request();
            let snapshot: FormSnapshot = test::call_and_read_body_json(&app, req).await;
            assert_eq!(snapshot.state, FormState::Editing);
        }
        assert_eq!(controller.record().phone, "(11) 99999-8888");

        let req = test::TestRequest::post().uri("/api/form/submit").to_request();
        let response: ActionResponse = test::call_and_read_body_json(&app, req).await;
        let receipt = response.artifact.expect("receipt");
        assert!(response.form.record.is_empty());
        let url = receipt.download_url.expect("download url");

        let req = test::TestRequest::get().uri(&url).to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body = test::read_body(resp).await;
        assert!(body.starts_with(b"%PDF"));

        let req = test::TestRequest::get().uri(&url).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
        let error: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(error.error, "Document not found");
    }

    #[actix_web::test]
    async fn test_rejected_submit_keeps_form() {
        let (controller, _) = browser_app_state();
        controller.apply_edit(shared_types::FormField::Email, "a@a.com");
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(controller.clone()))
                .route("/api/form/submit", web::post().to(submit_form)),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/form/submit").to_request();
        let response: ActionResponse = test::call_and_read_body_json(&app, req).await;

        assert!(response.artifact.is_none());
        assert_eq!(
            response.notice.message,
            "Please fill in the required fields: Name, Email and Phone"
        );
        assert_eq!(response.form.record.email, "a@a.com");
    }

    #[actix_web::test]
    async fn test_download_without_browser_target() {
        let app = test::init_service(
            App::new().route("/api/exports/{file_name}", web::get().to(download_export)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/exports/formulario_ana_1.pdf")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
        let error: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(error.error, "Downloads are not enabled for this export target");
    }
}
