use futures::future::LocalBoxFuture;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use snafu::ResultExt;

use super::error::{
    ApiResult, BuildClientSnafu, BuildUploadSnafu, DecodeSnafu, RejectedSnafu, StatusSnafu,
    TransportSnafu,
};
use super::{
    CHAT_PATH, CLEAR_FILE_PATH, ChatApi, ChatReply, ChatRequest, Envelope, FILE_STATUS_PATH,
    FileStatus, UPLOAD_PATH,
};
use crate::chat::{UploadSource, UploadedFile};
use crate::settings::WidgetSettings;

/// Multipart field name the upload endpoint reads.
const UPLOAD_FIELD: &str = "file";

/// reqwest-backed client for the widget backend.
///
/// Native builds keep a cookie store because the backend keys the active file by
/// session cookie; in the browser `fetch` handles cookies itself.
#[derive(Debug, Clone)]
pub struct HttpChatApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpChatApi {
    pub fn new(settings: &WidgetSettings) -> ApiResult<Self> {
        let builder = reqwest::Client::builder();

        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(settings.request_timeout())
            .cookie_store(true);

        let client = builder.build().context(BuildClientSnafu {
            stage: "build-http-client",
        })?;

        Ok(Self::with_client(settings.base_url.clone(), client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Reads the body as JSON regardless of HTTP status; error payloads arrive with 4xx/5xx.
    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        endpoint: &str,
    ) -> ApiResult<T> {
        let body = response.text().await.context(TransportSnafu {
            stage: "read-response-body",
            endpoint,
        })?;

        serde_json::from_str(&body).context(DecodeSnafu {
            stage: "decode-response-body",
            endpoint,
        })
    }

    fn unwrap_envelope<T>(envelope: Envelope<T>, endpoint: &str) -> ApiResult<T> {
        match envelope {
            Envelope::Success(value) => Ok(value),
            Envelope::Failure { error } => RejectedSnafu {
                stage: "api-error-payload",
                endpoint,
                message: error,
            }
            .fail(),
        }
    }

    async fn send_chat(&self, request: ChatRequest) -> ApiResult<String> {
        let endpoint = self.endpoint(CHAT_PATH);
        tracing::debug!(
            endpoint = %endpoint,
            has_file_content = request.file_content.is_some(),
            "sending chat request"
        );

        let response = self
            .client
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .context(TransportSnafu {
                stage: "send-chat-request",
                endpoint: endpoint.clone(),
            })?;

        let envelope: Envelope<ChatReply> = Self::read_json(response, &endpoint).await?;
        Self::unwrap_envelope(envelope, &endpoint).map(|reply| reply.response)
    }

    async fn send_upload(&self, file: UploadSource) -> ApiResult<UploadedFile> {
        let endpoint = self.endpoint(UPLOAD_PATH);
        let mime_type = file.mime_type();
        tracing::debug!(
            endpoint = %endpoint,
            file_name = %file.file_name,
            size = file.bytes.len(),
            "uploading file"
        );

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name.clone())
            .mime_str(mime_type)
            .context(BuildUploadSnafu {
                stage: "build-upload-part",
                file_name: file.file_name,
            })?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .context(TransportSnafu {
                stage: "send-upload-request",
                endpoint: endpoint.clone(),
            })?;

        let envelope: Envelope<UploadedFile> = Self::read_json(response, &endpoint).await?;
        Self::unwrap_envelope(envelope, &endpoint)
    }

    async fn send_clear_file(&self) -> ApiResult<()> {
        let endpoint = self.endpoint(CLEAR_FILE_PATH);
        let response = self
            .client
            .post(&endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .context(TransportSnafu {
                stage: "send-clear-file-request",
                endpoint: endpoint.clone(),
            })?;

        let _: serde_json::Value = Self::read_json(response, &endpoint).await?;
        Ok(())
    }

    async fn fetch_file_status(&self) -> ApiResult<FileStatus> {
        let endpoint = self.endpoint(FILE_STATUS_PATH);
        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .context(TransportSnafu {
                stage: "send-file-status-request",
                endpoint: endpoint.clone(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return StatusSnafu {
                stage: "file-status-http-status",
                endpoint,
                status: status.as_u16(),
            }
            .fail();
        }

        Self::read_json(response, &endpoint).await
    }
}

impl ChatApi for HttpChatApi {
    fn chat<'a>(&'a self, request: ChatRequest) -> LocalBoxFuture<'a, ApiResult<String>> {
        Box::pin(self.send_chat(request))
    }

    fn upload<'a>(&'a self, file: UploadSource) -> LocalBoxFuture<'a, ApiResult<UploadedFile>> {
        Box::pin(self.send_upload(file))
    }

    fn clear_file<'a>(&'a self) -> LocalBoxFuture<'a, ApiResult<()>> {
        Box::pin(self.send_clear_file())
    }

    fn file_status<'a>(&'a self) -> LocalBoxFuture<'a, ApiResult<FileStatus>> {
        Box::pin(self.fetch_file_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_without_double_slash() {
        let api = HttpChatApi::with_client("http://127.0.0.1:5000/", reqwest::Client::new());

        assert_eq!(api.base_url(), "http://127.0.0.1:5000");
        assert_eq!(api.endpoint(CHAT_PATH), "http://127.0.0.1:5000/api/chat");
        assert_eq!(
            api.endpoint(FILE_STATUS_PATH),
            "http://127.0.0.1:5000/api/get-file-status"
        );
    }

    #[test]
    fn failure_envelope_becomes_rejection() {
        let envelope: Envelope<ChatReply> = Envelope::Failure {
            error: "too large".to_string(),
        };
        let error = HttpChatApi::unwrap_envelope(envelope, "http://h/api/upload")
            .expect_err("failure payload should be rejected");

        assert_eq!(error.rejection_message(), Some("too large"));
    }
}
