use serde::{Deserialize, Serialize};

/// File kinds the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Png,
    Jpg,
    Jpeg,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
        }
    }

    pub fn is_image(self) -> bool {
        !matches!(self, Self::Pdf)
    }

    /// Font Awesome class used by attachment bubbles.
    pub fn icon_class(self) -> &'static str {
        if self.is_image() {
            "fa-file-image"
        } else {
            "fa-file-pdf"
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpg | Self::Jpeg => "image/jpeg",
        }
    }

    /// Guesses the type from the extension after the last dot, case-insensitively.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, extension) = name.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" => Some(Self::Jpg),
            "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// Descriptor returned by a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Server-side unique name (`<uuid>_<original>`).
    pub filename: String,
    pub file_type: FileType,
    /// Extracted text for PDFs, a description for images.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}

impl UploadedFile {
    /// Content worth sending along with a chat message.
    pub fn chat_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|content| !content.is_empty())
    }
}

/// The single file attached to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveFile {
    /// Uploaded during this page session; content is known locally.
    Uploaded(UploadedFile),
    /// Reported by the status endpoint after a reload; content stays on the server.
    Restored {
        filename: String,
        file_type: Option<FileType>,
    },
}

impl ActiveFile {
    pub fn filename(&self) -> &str {
        match self {
            Self::Uploaded(file) => &file.filename,
            Self::Restored { filename, .. } => filename,
        }
    }

    pub fn chat_content(&self) -> Option<&str> {
        match self {
            Self::Uploaded(file) => file.chat_content(),
            Self::Restored { .. } => None,
        }
    }
}

/// A local file picked by the user, ready to be sent as multipart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSource {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadSource {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        FileType::from_file_name(&self.file_name)
            .map(FileType::mime_type)
            .unwrap_or("application/octet-stream")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_type_detection_ignores_case_and_unknown_extensions() {
        assert_eq!(FileType::from_file_name("Report.PDF"), Some(FileType::Pdf));
        assert_eq!(FileType::from_file_name("x-ray.final.jpeg"), Some(FileType::Jpeg));
        assert_eq!(FileType::from_file_name("notes.txt"), None);
        assert_eq!(FileType::from_file_name("README"), None);
    }

    #[test]
    fn upload_response_parses_without_optional_fields() {
        let file: UploadedFile =
            serde_json::from_str(r#"{"filename":"ab_scan.png","file_type":"png"}"#)
                .expect("descriptor should parse");

        assert_eq!(file.file_type, FileType::Png);
        assert_eq!(file.content, None);
        assert_eq!(file.chat_content(), None);
    }

    #[test]
    fn empty_content_is_not_sent_with_chat() {
        let file = UploadedFile {
            filename: "ab_blank.pdf".to_string(),
            file_type: FileType::Pdf,
            content: Some(String::new()),
            file_url: None,
        };

        assert_eq!(ActiveFile::Uploaded(file).chat_content(), None);
    }

    #[test]
    fn restored_file_has_name_but_no_content() {
        let restored = ActiveFile::Restored {
            filename: "a.pdf".to_string(),
            file_type: None,
        };

        assert_eq!(restored.filename(), "a.pdf");
        assert_eq!(restored.chat_content(), None);
    }

    #[test]
    fn unknown_upload_extension_falls_back_to_octet_stream() {
        assert_eq!(UploadSource::new("a.bin", vec![1]).mime_type(), "application/octet-stream");
        assert_eq!(UploadSource::new("a.jpg", vec![1]).mime_type(), "image/jpeg");
    }
}
