use snafu::Snafu;
use wasm_bindgen::JsValue;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum WebError {
    #[snafu(display("no global `window` on `{stage}`"))]
    NoWindow { stage: &'static str },

    #[snafu(display("element `{selector}` not found on `{stage}`"))]
    MissingElement {
        stage: &'static str,
        selector: String,
    },

    #[snafu(display("element `{selector}` is not a {expected} on `{stage}`"))]
    UnexpectedElement {
        stage: &'static str,
        selector: String,
        expected: &'static str,
    },

    #[snafu(display("DOM call failed on `{stage}`: {message}"))]
    Dom {
        stage: &'static str,
        message: String,
    },

    #[snafu(display("failed to create the HTTP client on `{stage}`: {source}"))]
    Client {
        stage: &'static str,
        source: medchat_widget::ApiError,
    },
}

pub type WebResult<T> = Result<T, WebError>;

impl From<WebError> for JsValue {
    fn from(error: WebError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

/// Text of a thrown JS value for logs and error messages.
pub(crate) fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Maps a `Result<_, JsValue>` into [`WebError::Dom`].
pub(crate) trait JsResultExt<T> {
    fn dom(self, stage: &'static str) -> WebResult<T>;
}

impl<T> JsResultExt<T> for Result<T, JsValue> {
    fn dom(self, stage: &'static str) -> WebResult<T> {
        self.map_err(|value| WebError::Dom {
            stage,
            message: js_message(&value),
        })
    }
}
