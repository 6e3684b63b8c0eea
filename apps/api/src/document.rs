use async_trait::async_trait;
use bytes::Bytes;
use tracing::warn;

/// Pulls plain text out of an uploaded resume. Implementations return an empty
/// string for unreadable input; the workflow treats that as fatal to the run.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, document: Bytes) -> String;
}

/// PDF extraction via `pdf-extract`, run on the blocking pool.
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, document: Bytes) -> String {
        // pdf-extract can panic on malformed input; a panic surfaces as a JoinError.
        let result =
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&document)).await;

        match result {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!("Error parsing PDF: {e}");
                String::new()
            }
            Err(e) => {
                warn!("PDF parser aborted: {e}");
                String::new()
            }
        }
    }
}
