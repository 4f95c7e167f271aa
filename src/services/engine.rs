use reqwest::multipart;
use reqwest::Client;
use std::time::Duration;

use crate::models::detection::Detection;

/// Extraction can take minutes for large multi-page PDFs; the engine treats a
/// document as one uninterruptible unit of work.
const EXTRACTION_TIMEOUT_SECS: u64 = 300;

/// Client for the OCR extraction engine inference service.
///
/// The engine is an opaque collaborator: document bytes and a media-type hint
/// go in, an ordered list of detections comes out. PDF rasterization and box
/// normalization happen on the engine side.
pub struct ExtractionClient {
    http: Client,
    base_url: String,
}

impl ExtractionClient {
    pub fn new(base_url: &str) -> Result<Self, EngineError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(EXTRACTION_TIMEOUT_SECS))
            .build()
            .map_err(EngineError::Http)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Submit document bytes for extraction and return the ordered detections.
    pub async fn extract(
        &self,
        document: &[u8],
        media_type: &str,
    ) -> Result<Vec<Detection>, EngineError> {
        let part = multipart::Part::bytes(document.to_vec())
            .file_name("document")
            .mime_str(media_type)
            .map_err(|_| EngineError::MediaType(media_type.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/inference/process", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(EngineError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(EngineError::Engine { status, detail });
        }

        response.json().await.map_err(EngineError::Http)
    }

    /// Check engine reachability (for health checks). Any HTTP response counts
    /// as reachable; only transport failures are reported.
    pub async fn health_check(&self) -> Result<(), EngineError> {
        self.http
            .get(&self.base_url)
            .send()
            .await
            .map_err(EngineError::Http)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid media type hint: {0}")]
    MediaType(String),

    #[error("engine returned {status}: {detail}")]
    Engine {
        status: reqwest::StatusCode,
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_engine_detection_payload() {
        // Representative inference service response for a two-detection page.
        let body = r#"[
            {
                "text": "INVOICE",
                "box": [[10.0, 12.5], [180.0, 12.5], [180.0, 40.0], [10.0, 40.0]],
                "confidence": 0.98,
                "page_number": 1
            },
            {
                "text": "Total: $42.00",
                "box": [[10.0, 700.0], [150.0, 700.0], [150.0, 720.0], [10.0, 720.0]],
                "confidence": 0.91,
                "page_number": 2
            }
        ]"#;

        let detections: Vec<Detection> = serde_json::from_str(body).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].text, "INVOICE");
        assert_eq!(detections[0].bounding_box[0], [10.0, 12.5]);
        assert_eq!(detections[1].page_number, 2);
    }

    #[test]
    fn empty_page_parses_to_no_detections() {
        let detections: Vec<Detection> = serde_json::from_str("[]").unwrap();
        assert!(detections.is_empty());
    }
}
