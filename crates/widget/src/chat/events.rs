use super::file::UploadSource;

/// Emitted when the user presses send or hits enter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submit {
    pub content: String,
}

impl Submit {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// User actions a host forwards to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Submit(Submit),
    /// A file was picked in the file input.
    FileSelected(UploadSource),
    ClearFile,
    ClosePreview,
}

impl From<Submit> for Intent {
    fn from(value: Submit) -> Self {
        Self::Submit(value)
    }
}

impl From<UploadSource> for Intent {
    fn from(value: UploadSource) -> Self {
        Self::FileSelected(value)
    }
}
