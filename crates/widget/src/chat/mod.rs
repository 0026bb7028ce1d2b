pub mod controller;
/// Intent contracts for host wiring.
pub mod events;
/// File descriptors returned by the upload endpoint.
pub mod file;
/// Transcript entities.
pub mod message;
/// Request sequencing used to reject stale responses.
pub mod sequence;
pub mod session;
pub mod view;

pub use controller::{ChatWidgetController, SubmitOutcome, UploadOutcome, ViewObserver};
pub use events::{Intent, Submit};
pub use file::{ActiveFile, FileType, UploadSource, UploadedFile};
pub use message::{Message, MessageBody, MessageId, Sender};
pub use sequence::{RequestSeq, RequestTracker, Settlement, SettleRejection, TurnState};
pub use session::{PreviewState, SessionState, StatusTicket, UploadStatus};
pub use view::{
    BubbleContent, BubbleView, IndicatorView, PreviewView, WidgetView, render, render_file_preview,
    render_message,
};
