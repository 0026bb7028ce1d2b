//! Explicit per-page session state owned by the controller.

use super::file::{ActiveFile, FileType, UploadedFile};
use super::message::{Message, MessageId};
use super::sequence::{RequestTracker, TurnState};

/// Identifies which status text an expiry timer was armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusTicket(pub u64);

/// Text shown next to the upload button.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadStatus {
    text: String,
    issued: u64,
}

impl UploadStatus {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text and invalidates every earlier ticket.
    pub fn show(&mut self, text: impl Into<String>) -> StatusTicket {
        self.issued = self.issued.saturating_add(1);
        self.text = text.into();
        StatusTicket(self.issued)
    }

    /// Clears the text only if nothing newer was shown since `ticket`.
    pub fn expire(&mut self, ticket: StatusTicket) -> bool {
        if ticket.0 != self.issued || self.text.is_empty() {
            return false;
        }

        self.text.clear();
        true
    }
}

/// Preview panel contents. The data stays loaded while the panel is hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewState {
    pub open: bool,
    pub file: Option<UploadedFile>,
}

impl PreviewState {
    pub fn show(&mut self, file: UploadedFile) {
        self.file = Some(file);
        self.open = true;
    }

    pub fn hide(&mut self) {
        self.open = false;
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub messages: Vec<Message>,
    pub draft: String,
    pub active_file: Option<ActiveFile>,
    pub preview: PreviewState,
    pub upload_status: UploadStatus,
    pub chat_requests: RequestTracker,
    pub uploads: RequestTracker,
    next_message_id: u64,
    file_generation: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user_text(&mut self, text: impl Into<String>) -> MessageId {
        let id = self.alloc_message_id();
        self.messages.push(Message::user_text(id, text));
        id
    }

    pub fn push_bot_text(&mut self, text: impl Into<String>) -> MessageId {
        let id = self.alloc_message_id();
        self.messages.push(Message::bot_text(id, text));
        id
    }

    pub fn push_attachment(&mut self, name: impl Into<String>, file_type: FileType) -> MessageId {
        let id = self.alloc_message_id();
        self.messages.push(Message::attachment(id, name, file_type));
        id
    }

    /// Makes `file` the active file and loads it into the preview panel.
    pub fn attach(&mut self, file: UploadedFile) {
        self.preview.show(file.clone());
        self.active_file = Some(ActiveFile::Uploaded(file));
        self.file_generation = self.file_generation.saturating_add(1);
    }

    pub fn detach(&mut self) {
        self.active_file = None;
        self.file_generation = self.file_generation.saturating_add(1);
    }

    /// Bumped by every local attach or detach.
    pub fn file_generation(&self) -> u64 {
        self.file_generation
    }

    pub fn has_active_file(&self) -> bool {
        self.active_file.is_some()
    }

    pub fn awaiting_response(&self) -> bool {
        matches!(
            self.chat_requests.state(),
            TurnState::AwaitingResponse { .. }
        )
    }

    fn alloc_message_id(&mut self) -> MessageId {
        self.next_message_id = self.next_message_id.saturating_add(1);
        MessageId::new(self.next_message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf() -> UploadedFile {
        UploadedFile {
            filename: "u1_report.pdf".to_string(),
            file_type: FileType::Pdf,
            content: Some("WBC 11.2".to_string()),
            file_url: Some("http://localhost/uploads/u1_report.pdf".to_string()),
        }
    }

    #[test]
    fn stale_ticket_does_not_clear_newer_status() {
        let mut status = UploadStatus::default();
        let first = status.show("Uploading...");
        let second = status.show("Upload successful!");

        assert!(!status.expire(first));
        assert_eq!(status.text(), "Upload successful!");
        assert!(status.expire(second));
        assert_eq!(status.text(), "");
    }

    #[test]
    fn detaching_keeps_preview_data() {
        let mut session = SessionState::new();
        session.attach(pdf());
        session.preview.hide();
        session.detach();

        assert!(!session.has_active_file());
        assert_eq!(session.file_generation(), 2);
        assert_eq!(session.preview.file, Some(pdf()));
        assert!(!session.preview.open);
    }

    #[test]
    fn message_ids_are_unique_and_increasing() {
        let mut session = SessionState::new();
        let first = session.push_user_text("hello");
        let second = session.push_bot_text("hi");
        let third = session.push_attachment("report.pdf", FileType::Pdf);

        assert!(first < second && second < third);
        assert_eq!(session.messages.len(), 3);
    }
}
