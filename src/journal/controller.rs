use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::journal::model::{CreateFolderRequest, MomentInput};
use crate::journal::service::JournalService;
use crate::middleware::auth::Viewer;
use crate::utils::error::CustomError;
use crate::utils::uploads::extract_files_from_multipart;

pub async fn list_folders(
    journal_service: web::Data<JournalService>,
    viewer: Viewer,
) -> Result<HttpResponse, CustomError> {
    let folders = journal_service.list_folders(&viewer).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Folders retrieved successfully",
        "httpStatusCode": 200,
        "count": folders.len(),
        "data": folders
    })))
}

pub async fn create_folder(
    journal_service: web::Data<JournalService>,
    viewer: Viewer,
    body: web::Json<CreateFolderRequest>,
) -> Result<HttpResponse, CustomError> {
    let folder = journal_service.create_folder(&viewer, &body.name).await?;
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Folder created successfully",
        "httpStatusCode": 201,
        "data": folder
    })))
}

pub async fn delete_folder(
    journal_service: web::Data<JournalService>,
    viewer: Viewer,
    folder_id: web::Path<i64>,
) -> Result<HttpResponse, CustomError> {
    journal_service
        .delete_folder(&viewer, folder_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Folder deleted successfully",
        "httpStatusCode": 200
    })))
}

pub async fn list_moments(
    journal_service: web::Data<JournalService>,
    viewer: Viewer,
) -> Result<HttpResponse, CustomError> {
    let moments = journal_service.list_moments(&viewer).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Moments retrieved successfully",
        "httpStatusCode": 200,
        "count": moments.len(),
        "data": moments
    })))
}

pub async fn create_moment(
    journal_service: web::Data<JournalService>,
    viewer: Viewer,
    body: web::Json<MomentInput>,
) -> Result<HttpResponse, CustomError> {
    let id = journal_service
        .create_moment(&viewer, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Moment saved",
        "httpStatusCode": 201,
        "data": { "id": id }
    })))
}

pub async fn update_moment(
    journal_service: web::Data<JournalService>,
    viewer: Viewer,
    moment_id: web::Path<i64>,
    body: web::Json<MomentInput>,
) -> Result<HttpResponse, CustomError> {
    journal_service
        .update_moment(&viewer, moment_id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Moment updated",
        "httpStatusCode": 200
    })))
}

pub async fn delete_moment(
    journal_service: web::Data<JournalService>,
    viewer: Viewer,
    moment_id: web::Path<i64>,
) -> Result<HttpResponse, CustomError> {
    journal_service
        .delete_moment(&viewer, moment_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Moment deleted",
        "httpStatusCode": 200
    })))
}

/// Multipart upload; files go in `file` or `files` fields
pub async fn upload_photos(
    journal_service: web::Data<JournalService>,
    viewer: Viewer,
    moment_id: web::Path<i64>,
    payload: Multipart,
) -> Result<HttpResponse, CustomError> {
    let files = extract_files_from_multipart(payload)
        .await
        .map_err(CustomError::BadRequestError)?;

    let paths = journal_service
        .upload_photos(&viewer, moment_id.into_inner(), files)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": format!("{} photo(s) uploaded", paths.len()),
        "httpStatusCode": 201,
        "data": paths
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::database::{StorageBucket, SupabaseClient};
    use crate::journal::index::journal_routes;
    use crate::middleware::auth::test_support::{token_for, verifier};

    use super::*;

    fn journal(server: &MockServer) -> web::Data<JournalService> {
        let client = SupabaseClient::new(server.uri(), "anon");
        let bucket = StorageBucket::new(client.clone(), "moment-photos");
        web::Data::new(JournalService::new(client, bucket))
    }

    #[actix_web::test]
    async fn folder_with_blank_name_is_rejected() {
        let server = MockServer::start().await;
        let app = test::init_service(
            App::new()
                .app_data(verifier())
                .app_data(journal(&server))
                .configure(journal_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/folders")
            .insert_header(("Authorization", format!("Bearer {}", token_for(Uuid::from_u128(4)))))
            .set_json(json!({ "name": " " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn photo_upload_reads_multipart_files() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(wiremock::matchers::path_regex(r"^/storage/v1/object/moment-photos/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/moment_photos"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let app = test::init_service(
            App::new()
                .app_data(verifier())
                .app_data(journal(&server))
                .configure(journal_routes),
        )
        .await;

        let boundary = "XBOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"grid walk.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{b}--\r\n",
            b = boundary
        );
        let req = test::TestRequest::post()
            .uri("/moments/3/photos")
            .insert_header(("Authorization", format!("Bearer {}", token_for(Uuid::from_u128(4)))))
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={}", boundary),
            ))
            .set_payload(body)
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp["httpStatusCode"], 201);
        assert!(resp["data"][0].as_str().unwrap().ends_with("-grid-walk.png"));
    }
}
