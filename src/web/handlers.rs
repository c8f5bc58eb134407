// src/web/handlers.rs
use crate::export::{ExportOutcome, ExportPipeline};
use crate::form_binder::{FormError, PhotoError};
use crate::session::CvSession;
use crate::types::{CvField, CvRecord};
use crate::web::types::*;

use rocket::form::Form;
use rocket::serde::json::Json;
use rocket::State;
use tokio::io::AsyncReadExt;
use tracing::{error, info, warn};

type HandlerResult<T> = Result<T, Json<StandardErrorResponse>>;

fn photo_error_response(e: &PhotoError) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        e.message.clone(),
        e.error_type.code().to_string(),
        vec![e.suggestion.clone()],
    ))
}

fn form_error_response(e: &FormError) -> Json<StandardErrorResponse> {
    match e {
        FormError::UnknownField(unknown) => Json(StandardErrorResponse::new(
            unknown.to_string(),
            "UNKNOWN_FIELD".to_string(),
            vec![format!(
                "Use one of: {}",
                CvField::ALL
                    .iter()
                    .filter(|f| **f != CvField::Image)
                    .map(CvField::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )],
        )),
        FormError::NotATextField(field) => Json(StandardErrorResponse::new(
            e.to_string(),
            "NOT_A_TEXT_FIELD".to_string(),
            vec![format!("Upload the {} through /api/cv/photo", field.label())],
        )),
        FormError::Photo(photo) => photo_error_response(photo),
    }
}

pub async fn get_record_handler(session: &State<CvSession>) -> Json<DataResponse<CvRecord>> {
    Json(DataResponse::success(
        "Current CV".to_string(),
        session.record(),
    ))
}

pub async fn edit_field_handler(
    request: Json<FieldEditRequest>,
    session: &State<CvSession>,
) -> HandlerResult<Json<ActionResponse>> {
    let FieldEditRequest { field, value } = request.into_inner();
    match session.edit(&field, value) {
        Ok(field) => Ok(Json(
            ActionResponse::success(format!("{} updated", field.label()), "updated".to_string())
                .with_next_actions(vec!["refresh_preview".to_string()]),
        )),
        Err(e) => {
            warn!("Rejected edit of '{}': {}", field, e);
            Err(form_error_response(&e))
        }
    }
}

pub async fn upload_photo_handler(
    upload: Form<PhotoForm<'_>>,
    session: &State<CvSession>,
) -> HandlerResult<Json<ActionResponse>> {
    let mut bytes = Vec::new();
    let read = match upload.file.open().await {
        Ok(reader) => {
            let mut reader = std::pin::pin!(reader);
            reader.read_to_end(&mut bytes).await.map(|_| ())
        }
        Err(e) => Err(e),
    };
    if let Err(e) = read {
        error!("Failed to read uploaded photo: {}", e);
        return Err(Json(StandardErrorResponse::new(
            "Failed to process uploaded file".to_string(),
            "UPLOAD_ERROR".to_string(),
            vec!["Please try uploading again".to_string()],
        )));
    }

    match session.set_photo(&bytes) {
        Ok(()) => {
            info!("Profile photo uploaded ({} bytes)", bytes.len());
            Ok(Json(
                ActionResponse::success("Photo updated".to_string(), "uploaded".to_string())
                    .with_next_actions(vec!["refresh_preview".to_string()]),
            ))
        }
        Err(e) => {
            warn!("Rejected photo upload: {}", e);
            Err(form_error_response(&e))
        }
    }
}

pub async fn preview_handler(session: &State<CvSession>) -> Option<SvgResponse> {
    session.preview_svg().map(SvgResponse)
}

pub async fn export_handler(
    session: &State<CvSession>,
    pipeline: &State<ExportPipeline>,
) -> HandlerResult<ExportReply> {
    let report = session.export(pipeline).await;
    info!(
        "Export {} finished after {:?}",
        report.export_id, report.states
    );

    match report.outcome {
        ExportOutcome::Emitted(artifact) => Ok(ExportReply::Pdf(PdfResponse::with_filename(
            artifact.bytes,
            artifact.file_name,
        ))),
        ExportOutcome::Skipped => Ok(ExportReply::Skipped),
        ExportOutcome::Reported { message } => Err(Json(StandardErrorResponse::new(
            message,
            "EXPORT_FAILED".to_string(),
            vec![
                "Try again in a few moments".to_string(),
                "Wait for a running export to finish before starting another".to_string(),
            ],
        ))),
    }
}

pub async fn health_handler() -> Json<TextResponse> {
    Json(TextResponse::success("OK".to_string()))
}
