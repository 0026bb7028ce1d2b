use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(display("failed to build http client on `{stage}`: {source}"))]
    BuildClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("request to {endpoint} failed on `{stage}`: {source}"))]
    Transport {
        stage: &'static str,
        endpoint: String,
        source: reqwest::Error,
    },
    #[snafu(display("{endpoint} returned status {status}"))]
    Status {
        stage: &'static str,
        endpoint: String,
        status: u16,
    },
    #[snafu(display("failed to decode response from {endpoint} on `{stage}`: {source}"))]
    Decode {
        stage: &'static str,
        endpoint: String,
        source: serde_json::Error,
    },
    #[snafu(display("failed to attach upload `{file_name}` on `{stage}`: {source}"))]
    BuildUpload {
        stage: &'static str,
        file_name: String,
        source: reqwest::Error,
    },
    /// The backend answered with an error payload.
    #[snafu(display("{endpoint} rejected the request: {message}"))]
    Rejected {
        stage: &'static str,
        endpoint: String,
        message: String,
    },
}

impl ApiError {
    /// Server-supplied error text for application-level failures.
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
