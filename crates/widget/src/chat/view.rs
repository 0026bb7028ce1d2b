//! Immutable view model rendered from [`SessionState`].
//!
//! Hosts paint these values; nothing here touches the network.

use super::file::UploadedFile;
use super::message::{Message, MessageBody, MessageId, Sender};
use super::session::SessionState;

/// One transcript bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubbleView {
    /// `None` for the typing indicator.
    pub id: Option<MessageId>,
    pub sender: Sender,
    /// Full class attribute, e.g. `message bot`.
    pub class_name: String,
    pub content: BubbleContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BubbleContent {
    Paragraphs(Vec<String>),
    File { icon_class: String, name: String },
    TypingDots(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewView {
    pub open: bool,
    pub file_info: String,
    /// Hidden text extract for PDFs.
    pub file_content: Option<String>,
    /// Hidden image source for pictures.
    pub image_src: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorView {
    pub visible: bool,
    pub filename: String,
}

impl IndicatorView {
    /// CSS `display` value for the indicator bar.
    pub fn display(&self) -> &'static str {
        if self.visible { "flex" } else { "none" }
    }
}

/// Everything a host needs to paint the widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetView {
    pub transcript: Vec<BubbleView>,
    pub typing: Option<BubbleView>,
    pub draft: String,
    pub upload_status: String,
    pub preview: PreviewView,
    pub indicator: IndicatorView,
}

impl WidgetView {
    /// Bubbles in display order with the typing indicator last.
    pub fn bubbles(&self) -> impl Iterator<Item = &BubbleView> {
        self.transcript.iter().chain(self.typing.iter())
    }
}

const TYPING_DOT_COUNT: usize = 3;

pub fn render(session: &SessionState) -> WidgetView {
    let indicator = match &session.active_file {
        Some(file) => IndicatorView {
            visible: true,
            filename: file.filename().to_string(),
        },
        None => IndicatorView::default(),
    };

    let mut preview = session
        .preview
        .file
        .as_ref()
        .map(render_file_preview)
        .unwrap_or_default();
    preview.open = session.preview.open;

    WidgetView {
        transcript: session.messages.iter().map(render_message).collect(),
        typing: session.awaiting_response().then(render_typing_indicator),
        draft: session.draft.clone(),
        upload_status: session.upload_status.text().to_string(),
        preview,
        indicator,
    }
}

pub fn render_message(message: &Message) -> BubbleView {
    let content = match &message.body {
        MessageBody::Text(text) => BubbleContent::Paragraphs(Message::paragraphs(text)),
        MessageBody::Attachment { name, file_type } => BubbleContent::File {
            icon_class: format!("file-icon fas {}", file_type.icon_class()),
            name: name.clone(),
        },
    };

    BubbleView {
        id: Some(message.id),
        sender: message.sender,
        class_name: format!("message {}", message.sender.class_name()),
        content,
    }
}

/// Preview panel contents for `file`; `open` is left to the caller.
pub fn render_file_preview(file: &UploadedFile) -> PreviewView {
    let (file_content, image_src) = if file.file_type.is_image() {
        (None, file.file_url.clone())
    } else {
        (file.content.clone(), None)
    };

    PreviewView {
        open: false,
        file_info: file.filename.clone(),
        file_content,
        image_src,
    }
}

fn render_typing_indicator() -> BubbleView {
    BubbleView {
        id: None,
        sender: Sender::Bot,
        class_name: format!("message {} typing-indicator", Sender::Bot.class_name()),
        content: BubbleContent::TypingDots(TYPING_DOT_COUNT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::file::FileType;

    fn image() -> UploadedFile {
        UploadedFile {
            filename: "u2_scan.png".to_string(),
            file_type: FileType::Png,
            content: Some("[Image content from u2_scan.png]".to_string()),
            file_url: Some("http://localhost/uploads/u2_scan.png".to_string()),
        }
    }

    #[test]
    fn text_bubble_splits_paragraphs() {
        let message = Message::bot_text(MessageId::new(1), "Line one\n\nLine two");
        let bubble = render_message(&message);

        assert_eq!(bubble.class_name, "message bot");
        assert_eq!(
            bubble.content,
            BubbleContent::Paragraphs(vec!["Line one".to_string(), "Line two".to_string()])
        );
    }

    #[test]
    fn pdf_attachment_uses_pdf_icon() {
        let message = Message::attachment(MessageId::new(1), "labs.pdf", FileType::Pdf);

        assert_eq!(
            render_message(&message).content,
            BubbleContent::File {
                icon_class: "file-icon fas fa-file-pdf".to_string(),
                name: "labs.pdf".to_string(),
            }
        );
    }

    #[test]
    fn image_preview_keeps_url_not_text() {
        let preview = render_file_preview(&image());

        assert_eq!(preview.file_info, "u2_scan.png");
        assert_eq!(preview.file_content, None);
        assert_eq!(
            preview.image_src.as_deref(),
            Some("http://localhost/uploads/u2_scan.png")
        );
    }

    #[test]
    fn typing_indicator_follows_in_flight_requests() {
        let mut session = SessionState::new();
        session.push_user_text("hello");
        let seq = session.chat_requests.begin();

        let view = render(&session);
        assert_eq!(view.bubbles().count(), 2);
        assert_eq!(
            view.typing.as_ref().map(|bubble| bubble.class_name.as_str()),
            Some("message bot typing-indicator")
        );

        let _ = session.chat_requests.settle(seq);
        assert_eq!(render(&session).typing, None);
    }

    #[test]
    fn indicator_mirrors_active_file() {
        let mut session = SessionState::new();
        assert_eq!(render(&session).indicator.display(), "none");

        session.attach(image());
        let view = render(&session);
        assert!(view.indicator.visible);
        assert_eq!(view.indicator.filename, "u2_scan.png");
        assert!(view.preview.open);
    }
}
