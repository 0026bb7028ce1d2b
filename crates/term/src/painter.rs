use medchat_widget::Sender;
use medchat_widget::chat::{BubbleContent, BubbleView, IndicatorView};
use medchat_widget::WidgetView;

/// Turns successive widget snapshots into terminal lines.
///
/// The transcript is append-only, so only bubbles past the last painted index are
/// printed. Everything else is printed when it changes.
#[derive(Debug, Default)]
pub struct TerminalPainter {
    painted_bubbles: usize,
    typing: bool,
    upload_status: String,
    indicator: IndicatorView,
    preview_open: bool,
}

impl TerminalPainter {
    pub fn paint(&mut self, view: &WidgetView) -> Vec<String> {
        let mut lines = Vec::new();

        for bubble in view.transcript.iter().skip(self.painted_bubbles) {
            lines.extend(Self::bubble_lines(bubble));
        }
        self.painted_bubbles = view.transcript.len();

        let typing = view.typing.is_some();
        if typing && !self.typing {
            lines.push("bot is typing...".to_string());
        }
        self.typing = typing;

        if view.upload_status != self.upload_status {
            if !view.upload_status.is_empty() {
                lines.push(format!("[upload] {}", view.upload_status));
            }
            self.upload_status = view.upload_status.clone();
        }

        if view.indicator != self.indicator {
            if view.indicator.visible {
                lines.push(format!("[active file] {}", view.indicator.filename));
            } else {
                lines.push("[active file] none".to_string());
            }
            self.indicator = view.indicator.clone();
        }

        if view.preview.open && !self.preview_open {
            lines.push(Self::preview_line(view));
        }
        self.preview_open = view.preview.open;

        lines
    }

    fn bubble_lines(bubble: &BubbleView) -> Vec<String> {
        let prefix = match bubble.sender {
            Sender::User => "you",
            Sender::Bot => "bot",
        };

        match &bubble.content {
            BubbleContent::Paragraphs(paragraphs) => paragraphs
                .iter()
                .enumerate()
                .map(|(index, paragraph)| {
                    if index == 0 {
                        format!("{prefix}> {paragraph}")
                    } else {
                        format!("{:width$}  {paragraph}", "", width = prefix.len())
                    }
                })
                .collect(),
            BubbleContent::File { name, .. } => vec![format!("{prefix}> [file] {name}")],
            BubbleContent::TypingDots(_) => Vec::new(),
        }
    }

    fn preview_line(view: &WidgetView) -> String {
        let preview = &view.preview;
        match (&preview.file_content, &preview.image_src) {
            (Some(content), _) => format!(
                "[preview] {} ({} lines of text)",
                preview.file_info,
                content.lines().count()
            ),
            (None, Some(src)) => format!("[preview] {} ({src})", preview.file_info),
            (None, None) => format!("[preview] {}", preview.file_info),
        }
    }
}

#[cfg(test)]
mod tests {
    use medchat_widget::chat::{MessageId, PreviewView};

    use super::*;

    fn text_bubble(id: u64, sender: Sender, paragraphs: &[&str]) -> BubbleView {
        BubbleView {
            id: Some(MessageId::new(id)),
            sender,
            class_name: String::new(),
            content: BubbleContent::Paragraphs(
                paragraphs.iter().map(|line| line.to_string()).collect(),
            ),
        }
    }

    #[test]
    fn only_new_bubbles_are_printed() {
        let mut painter = TerminalPainter::default();
        let mut view = WidgetView {
            transcript: vec![text_bubble(1, Sender::User, &["hello"])],
            ..WidgetView::default()
        };
        assert_eq!(painter.paint(&view), vec!["you> hello"]);

        view.transcript
            .push(text_bubble(2, Sender::Bot, &["Hi.", "How can I help?"]));
        assert_eq!(
            painter.paint(&view),
            vec!["bot> Hi.", "     How can I help?"]
        );
        assert!(painter.paint(&view).is_empty());
    }

    #[test]
    fn status_and_indicator_print_on_change() {
        let mut painter = TerminalPainter::default();
        let view = WidgetView {
            upload_status: "too large".to_string(),
            ..WidgetView::default()
        };
        assert_eq!(painter.paint(&view), vec!["[upload] too large"]);

        let view = WidgetView {
            indicator: IndicatorView {
                visible: true,
                filename: "a.pdf".to_string(),
            },
            preview: PreviewView {
                open: true,
                file_info: "a.pdf".to_string(),
                file_content: Some("line 1\nline 2".to_string()),
                image_src: None,
            },
            ..WidgetView::default()
        };
        assert_eq!(
            painter.paint(&view),
            vec![
                "[active file] a.pdf".to_string(),
                "[preview] a.pdf (2 lines of text)".to_string(),
            ]
        );
    }
}
