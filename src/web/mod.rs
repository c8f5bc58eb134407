// src/web/mod.rs

pub mod handlers;
pub mod page;
pub mod types;

pub use types::*;

use crate::export::ExportPipeline;
use crate::session::CvSession;
use anyhow::{Context, Result};
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use tracing::info;

/// Photos are read fully into memory; this only bounds a single request.
const MAX_UPLOAD_MIB: u64 = 32;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new(
            "Access-Control-Expose-Headers",
            "Content-Disposition",
        ));
    }
}

#[get("/")]
pub async fn index(session: &State<CvSession>) -> RawHtml<String> {
    RawHtml(page::index_html(&session.record()))
}

#[get("/cv")]
pub async fn get_record(
    session: &State<CvSession>,
) -> Json<DataResponse<crate::types::CvRecord>> {
    handlers::get_record_handler(session).await
}

#[post("/cv/field", data = "<request>")]
pub async fn edit_field(
    request: Json<FieldEditRequest>,
    session: &State<CvSession>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    handlers::edit_field_handler(request, session).await
}

#[post("/cv/photo", data = "<upload>")]
pub async fn upload_photo(
    upload: Form<PhotoForm<'_>>,
    session: &State<CvSession>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    handlers::upload_photo_handler(upload, session).await
}

#[get("/cv/preview.svg")]
pub async fn preview(session: &State<CvSession>) -> Option<SvgResponse> {
    handlers::preview_handler(session).await
}

#[post("/cv/export")]
pub async fn export_cv(
    session: &State<CvSession>,
    pipeline: &State<ExportPipeline>,
) -> Result<ExportReply, Json<StandardErrorResponse>> {
    handlers::export_handler(session, pipeline).await
}

#[get("/health")]
pub async fn health() -> Json<TextResponse> {
    handlers::health_handler().await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(404)]
pub fn not_found(request: &Request<'_>) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("No route for {}", request.uri()),
        "NOT_FOUND".to_string(),
        vec!["Check the endpoint path".to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be parsed".to_string(),
        "UNPROCESSABLE".to_string(),
        vec!["Send {\"field\": \"...\", \"value\": \"...\"} as JSON".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Check the server log if the problem persists".to_string(),
        ],
    ))
}

/// Assembles the application without launching it.
pub fn build_rocket(session: CvSession, pipeline: ExportPipeline, port: u16) -> Rocket<Build> {
    let limits = Limits::default()
        .limit("file", MAX_UPLOAD_MIB.mebibytes())
        .limit("data-form", MAX_UPLOAD_MIB.mebibytes());
    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"))
        .merge(("limits", limits));

    rocket::custom(figment)
        .attach(Cors)
        .manage(session)
        .manage(pipeline)
        .register("/api", catchers![bad_request, not_found, unprocessable, internal_error])
        .mount("/", routes![index])
        .mount(
            "/api",
            routes![
                get_record,
                edit_field,
                upload_photo,
                preview,
                export_cv,
                health,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(session: CvSession, pipeline: ExportPipeline, port: u16) -> Result<()> {
    info!("Starting CV builder on http://0.0.0.0:{}", port);

    let _rocket = build_rocket(session, pipeline, port)
        .launch()
        .await
        .context("Web server stopped with an error")?;

    Ok(())
}
