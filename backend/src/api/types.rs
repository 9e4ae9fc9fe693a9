//! REST API types for the conversion endpoint.
//!
//! The payload travels inline; the client only has to save `content`
//! under `fileName` with `mediaType`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::transform::pipeline::{Conversion, ConversionReport};

/// Response sent after a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    /// Unique job identifier
    pub job_id: String,

    /// "ready" or "warning" (fallback or degraded output)
    pub status: String,

    pub file_name: String,

    pub media_type: String,

    /// Serialized table
    pub content: String,

    pub metadata: ConversionReport,
}

impl From<Conversion> for ConvertResponse {
    fn from(conversion: Conversion) -> Self {
        let report = conversion.report;
        let status = if report.degraded || report.strategy == crate::models::Strategy::Fallback {
            "warning"
        } else {
            "ready"
        };

        ConvertResponse {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            file_name: conversion.payload.suggested_file_name,
            media_type: conversion.payload.media_type,
            content: conversion.payload.content,
            metadata: report,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "content": null,
        "metadata": null
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::pipeline::{convert_str, ConvertOptions};

    #[test]
    fn test_response_from_items_conversion() {
        let conversion = convert_str(
            r#"<L><ITEM ID="1" DESCRIPTION="Lateral"/></L>"#,
            &ConvertOptions::default(),
        )
        .unwrap();
        let response = ConvertResponse::from(conversion);

        assert_eq!(response.status, "ready");
        assert_eq!(response.file_name, "modelos_converted.csv");
        assert_eq!(response.media_type, "text/csv");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["metadata"]["strategy"], "items");
        assert_eq!(json["metadata"]["rowCount"], 1);
        assert!(json["jobId"].as_str().is_some());
    }

    #[test]
    fn test_fallback_is_warning() {
        let conversion = convert_str("<L/>", &ConvertOptions::default()).unwrap();
        assert_eq!(ConvertResponse::from(conversion).status, "warning");
    }

    #[test]
    fn test_error_response_shape() {
        let body = error_response("No file provided");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "No file provided");
        assert!(body["content"].is_null());
    }
}
