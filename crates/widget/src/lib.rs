#![deny(unsafe_code)]

//! Client-side controller for the medchat widget.
//!
//! The controller owns the session state of one page (transcript, active file,
//! upload status, preview panel) and talks to the backend through [`api::ChatApi`].
//! Hosts render [`chat::WidgetView`] snapshots; the browser binding lives in
//! `medchat-web` and the terminal front end in `medchat`.

/// Backend HTTP contract and the reqwest client.
pub mod api;
/// Session state, controller and view model.
pub mod chat;
pub mod settings;
pub mod timer;

pub use api::{ApiError, ApiResult, ChatApi, ChatRequest, FileStatus, HttpChatApi};
pub use chat::{
    ActiveFile, ChatWidgetController, FileType, Intent, Message, MessageBody, MessageId, Sender,
    SessionState, SubmitOutcome, UploadOutcome, UploadSource, UploadedFile, WidgetView,
};
pub use settings::WidgetSettings;
pub use timer::Sleeper;
