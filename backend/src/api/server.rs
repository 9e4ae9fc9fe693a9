//! HTTP server for the cutting-list converter.
//!
//! Uploads are converted in one request; the serialized table comes back
//! inline in the JSON response.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/convert`    | Upload XML for conversion            |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |

use axum::{
    extract::Multipart,
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, path::Path, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, ConvertResponse};
use crate::error::{ConvertError, ServerError, ServerResult};
use crate::models::FormatKind;
use crate::transform::pipeline::{convert_bytes, ConvertOptions};

type Rejection = (StatusCode, Json<Value>);

/// Build the router with CORS applied.
pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/convert", post(convert_upload))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    eprintln!("🚀 Cutlist server running on http://localhost:{}", port);
    eprintln!("   POST /api/convert - Upload XML cutting list");
    eprintln!("   GET  /api/logs    - SSE log stream");
    eprintln!("   GET  /health      - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router()).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "cutlist",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "convert": "POST /api/convert",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip what they missed
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Fields collected from the multipart upload.
#[derive(Debug, Default)]
struct UploadForm {
    bytes: Option<Vec<u8>>,
    upload_name: Option<String>,
    format: Option<String>,
    file_name: Option<String>,
    options: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> ServerResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "file" => {
                    form.upload_name = field.file_name().map(|s| s.to_string());
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                    form.bytes = Some(data.to_vec());
                }
                "format" | "fileName" | "options" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                    let slot = match name.as_str() {
                        "format" => &mut form.format,
                        "fileName" => &mut form.file_name,
                        _ => &mut form.options,
                    };
                    *slot = Some(text).filter(|t| !t.trim().is_empty());
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Options JSON (or environment defaults), then the upload's own name,
    /// then the explicit `format` and `fileName` fields.
    fn options(&self) -> ServerResult<ConvertOptions> {
        let mut options = match &self.options {
            Some(raw) => serde_json::from_str::<ConvertOptions>(raw)
                .map_err(|e| ServerError::BadRequest(format!("Invalid options: {}", e)))?,
            None => {
                let mut options = ConvertOptions::from_env();
                if let Some(stem) = self.upload_stem() {
                    options.file_name = stem;
                }
                options
            }
        };

        if let Some(name) = &self.format {
            options.format = FormatKind::from_name(name)
                .ok_or_else(|| ServerError::BadRequest(format!("Unknown format: {}", name)))?;
        }
        if let Some(name) = &self.file_name {
            options.file_name = name.clone();
        }

        Ok(options)
    }

    fn upload_stem(&self) -> Option<String> {
        let name = self.upload_name.as_deref()?;
        Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string())
    }
}

/// Status code for a failed request.
fn status_of(err: &ServerError) -> StatusCode {
    match err {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Convert(ConvertError::Parse(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        ServerError::Convert(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: ServerError) -> Rejection {
    log_error(err.to_string());
    (status_of(&err), Json(error_response(&err.to_string())))
}

/// Conversion endpoint
async fn convert_upload(multipart: Multipart) -> Result<Json<ConvertResponse>, Rejection> {
    let form = UploadForm::read(multipart).await.map_err(reject)?;
    let options = form.options().map_err(reject)?;
    let bytes = form
        .bytes
        .ok_or_else(|| reject(ServerError::BadRequest("No file provided".into())))?;

    log_info(format!(
        "📄 New upload: {} ({} bytes)",
        form.upload_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    let conversion = tokio::task::spawn_blocking(move || convert_bytes(&bytes, &options))
        .await
        .map_err(|e| reject(ServerError::Internal(e.to_string())))?
        .map_err(|e| reject(ServerError::from(e)))?;

    Ok(Json(ConvertResponse::from(conversion)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, SourceError};

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(&ServerError::BadRequest("No file provided".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(&ServerError::Convert(ConvertError::Parse(ParseError::new("bad")))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(&ServerError::Convert(ConvertError::Source(SourceError::Empty))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_form_options_precedence() {
        let form = UploadForm {
            upload_name: Some("cozinha_01.xml".into()),
            format: Some("xls".into()),
            ..UploadForm::default()
        };
        let options = form.options().unwrap();
        assert_eq!(options.format, FormatKind::Xls);
        assert_eq!(options.file_name, "cozinha_01");

        let form = UploadForm {
            upload_name: Some("cozinha_01.xml".into()),
            file_name: Some("obra".into()),
            options: Some(r#"{"repeat_long_module_header": true}"#.into()),
            ..UploadForm::default()
        };
        let options = form.options().unwrap();
        assert_eq!(options.file_name, "obra");
        assert!(options.repeat_long_module_header);
    }

    #[test]
    fn test_form_rejects_unknown_format() {
        let form = UploadForm {
            format: Some("pdf".into()),
            ..UploadForm::default()
        };
        assert!(matches!(form.options(), Err(ServerError::BadRequest(_))));
    }

    #[test]
    fn test_form_rejects_invalid_options() {
        let form = UploadForm {
            options: Some("{not json".into()),
            ..UploadForm::default()
        };
        assert!(matches!(form.options(), Err(ServerError::BadRequest(_))));
    }
}
