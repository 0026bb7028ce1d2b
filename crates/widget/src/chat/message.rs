use super::file::FileType;

/// Stable identifier for one transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Creates a typed message identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Who a bubble belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// CSS modifier used by the transcript markup.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

/// What a bubble displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Attachment { name: String, file_type: FileType },
}

/// One transcript entry. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub body: MessageBody,
}

impl Message {
    pub fn new(id: MessageId, sender: Sender, body: MessageBody) -> Self {
        Self { id, sender, body }
    }

    pub fn user_text(id: MessageId, text: impl Into<String>) -> Self {
        Self::new(id, Sender::User, MessageBody::Text(text.into()))
    }

    pub fn bot_text(id: MessageId, text: impl Into<String>) -> Self {
        Self::new(id, Sender::Bot, MessageBody::Text(text.into()))
    }

    /// Attachment bubbles are always shown on the user side.
    pub fn attachment(id: MessageId, name: impl Into<String>, file_type: FileType) -> Self {
        Self::new(
            id,
            Sender::User,
            MessageBody::Attachment {
                name: name.into(),
                file_type,
            },
        )
    }

    /// Splits text into display paragraphs, dropping blank lines.
    pub fn paragraphs(text: &str) -> Vec<String> {
        text.split('\n')
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}
