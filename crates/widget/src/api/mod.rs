use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::chat::{FileType, UploadSource, UploadedFile};

mod error;
mod http;

pub use error::{ApiError, ApiResult};
pub use http::HttpChatApi;

pub const CHAT_PATH: &str = "/api/chat";
pub const UPLOAD_PATH: &str = "/api/upload";
pub const CLEAR_FILE_PATH: &str = "/api/clear-file";
pub const FILE_STATUS_PATH: &str = "/api/get-file-status";

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_content: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file_content: None,
        }
    }

    pub fn with_file_content(mut self, content: impl Into<String>) -> Self {
        self.file_content = Some(content.into());
        self
    }
}

/// Answer of `GET /api/get-file-status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    pub has_active_file: bool,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_type: Option<FileType>,
}

impl FileStatus {
    pub fn active(filename: impl Into<String>) -> Self {
        Self {
            has_active_file: true,
            filename: Some(filename.into()),
            file_type: None,
        }
    }
}

/// Backend seam used by the controller.
///
/// Futures are not `Send`: the browser implementation drives `fetch` promises on
/// the page's single thread.
pub trait ChatApi {
    /// Sends one chat turn and returns the bot reply text.
    fn chat<'a>(&'a self, request: ChatRequest) -> LocalBoxFuture<'a, ApiResult<String>>;
    fn upload<'a>(&'a self, file: UploadSource) -> LocalBoxFuture<'a, ApiResult<UploadedFile>>;
    /// Detaches the session file on the server. The response body is ignored.
    fn clear_file<'a>(&'a self) -> LocalBoxFuture<'a, ApiResult<()>>;
    fn file_status<'a>(&'a self) -> LocalBoxFuture<'a, ApiResult<FileStatus>>;
}

/// Either an `{"error": ...}` payload or the endpoint's success shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Failure { error: String },
    Success(T),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatReply {
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_omits_missing_file_content() {
        let body = serde_json::to_value(ChatRequest::new("what is LDL?"))
            .expect("request should serialize");

        assert_eq!(body, serde_json::json!({ "message": "what is LDL?" }));
    }

    #[test]
    fn chat_request_carries_file_content() {
        let body = serde_json::to_value(ChatRequest::new("").with_file_content("LDL 190"))
            .expect("request should serialize");

        assert_eq!(
            body,
            serde_json::json!({ "message": "", "file_content": "LDL 190" })
        );
    }

    #[test]
    fn envelope_prefers_error_payload() {
        let envelope: Envelope<ChatReply> =
            serde_json::from_str(r#"{"error":"No message or file content provided"}"#)
                .expect("envelope should parse");

        assert!(matches!(
            envelope,
            Envelope::Failure { error } if error == "No message or file content provided"
        ));
    }

    #[test]
    fn envelope_accepts_upload_success_with_extra_fields() {
        let envelope: Envelope<UploadedFile> = serde_json::from_str(
            r#"{"success":true,"filename":"u_a.pdf","file_type":"pdf","content":"x","file_url":"http://h/uploads/u_a.pdf"}"#,
        )
        .expect("envelope should parse");

        match envelope {
            Envelope::Success(file) => assert_eq!(file.filename, "u_a.pdf"),
            Envelope::Failure { error } => panic!("unexpected failure: {error}"),
        }
    }

    #[test]
    fn file_status_without_file_has_no_name() {
        let status: FileStatus =
            serde_json::from_str(r#"{"has_active_file":false}"#).expect("status should parse");

        assert_eq!(status, FileStatus::default());
    }
}
