//! Applies widget snapshots to the page.
//!
//! [`PaintedState`] remembers what the DOM already shows and yields a [`Patch`]
//! with only the parts that changed. [`DomPainter`] writes a patch to the elements.

use std::rc::Rc;

use medchat_widget::WidgetView;
use medchat_widget::chat::{BubbleContent, BubbleView, IndicatorView, PreviewView};
use web_sys::Element;

use crate::dom::{TYPING_INDICATOR_ID, WidgetDom};
use crate::error::{JsResultExt, WebResult};

const PREVIEW_ACTIVE_CLASS: &str = "active";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Patch<'a> {
    pub new_bubbles: &'a [BubbleView],
    /// `Some(Some(_))` inserts the typing bubble, `Some(None)` removes it.
    pub typing: Option<Option<&'a BubbleView>>,
    pub upload_status: Option<&'a str>,
    pub preview: Option<&'a PreviewView>,
    pub indicator: Option<&'a IndicatorView>,
    pub draft: Option<&'a str>,
}

impl Patch<'_> {
    pub fn is_empty(&self) -> bool {
        *self == Patch::default()
    }
}

#[derive(Debug, Default)]
pub struct PaintedState {
    bubbles: usize,
    typing: bool,
    upload_status: String,
    preview: PreviewView,
    indicator: IndicatorView,
    draft: String,
}

impl PaintedState {
    /// Diffs `view` against what was painted and records `view` as painted.
    pub fn advance<'a>(&mut self, view: &'a WidgetView) -> Patch<'a> {
        let mut patch = Patch {
            new_bubbles: view.transcript.get(self.bubbles..).unwrap_or_default(),
            ..Patch::default()
        };
        self.bubbles = view.transcript.len();

        if view.typing.is_some() != self.typing {
            self.typing = view.typing.is_some();
            patch.typing = Some(view.typing.as_ref());
        }
        if view.upload_status != self.upload_status {
            self.upload_status.clone_from(&view.upload_status);
            patch.upload_status = Some(&view.upload_status);
        }
        if view.preview != self.preview {
            self.preview.clone_from(&view.preview);
            patch.preview = Some(&view.preview);
        }
        if view.indicator != self.indicator {
            self.indicator.clone_from(&view.indicator);
            patch.indicator = Some(&view.indicator);
        }
        // The input is only written when the draft changes, so typing during a
        // pending reply is not overwritten by later snapshots.
        if view.draft != self.draft {
            self.draft.clone_from(&view.draft);
            patch.draft = Some(&view.draft);
        }

        patch
    }
}

pub struct DomPainter {
    dom: Rc<WidgetDom>,
    painted: PaintedState,
}

impl DomPainter {
    pub fn new(dom: Rc<WidgetDom>) -> Self {
        Self {
            dom,
            painted: PaintedState::default(),
        }
    }

    pub fn paint(&mut self, view: &WidgetView) -> WebResult<()> {
        let patch = self.painted.advance(view);
        if patch.is_empty() {
            return Ok(());
        }
        let dom = &self.dom;

        let typing_node = dom.document.get_element_by_id(TYPING_INDICATOR_ID);
        for bubble in patch.new_bubbles {
            let node = self.bubble_element(bubble)?;
            dom.chat_box
                .insert_before(&node, typing_node.as_deref())
                .dom("append-bubble")?;
        }

        match patch.typing {
            Some(Some(bubble)) => {
                let node = self.bubble_element(bubble)?;
                node.set_id(TYPING_INDICATOR_ID);
                dom.chat_box.append_child(&node).dom("show-typing-indicator")?;
            }
            Some(None) => {
                if let Some(node) = typing_node {
                    node.remove();
                }
            }
            None => {}
        }

        if !patch.new_bubbles.is_empty() || patch.typing.is_some() {
            dom.chat_box.set_scroll_top(dom.chat_box.scroll_height());
        }

        if let Some(text) = patch.upload_status {
            dom.upload_status.set_text_content(Some(text));
        }
        if let Some(preview) = patch.preview {
            self.paint_preview(preview)?;
        }
        if let Some(indicator) = patch.indicator {
            dom.active_file_indicator
                .style()
                .set_property("display", indicator.display())
                .dom("toggle-active-file-indicator")?;
            dom.active_file_name
                .set_text_content(Some(indicator.filename.as_str()));
        }
        if let Some(draft) = patch.draft {
            dom.user_input.set_value(draft);
        }

        Ok(())
    }

    fn paint_preview(&self, preview: &PreviewView) -> WebResult<()> {
        let dom = &self.dom;
        dom.file_info.set_text_content(Some(preview.file_info.as_str()));
        // Content and image stay hidden; they are only kept for the page's own use.
        if let Some(content) = &preview.file_content {
            dom.file_content.set_text_content(Some(content.as_str()));
        }
        if let Some(src) = &preview.image_src {
            dom.image_preview.set_src(src);
        }
        dom.file_preview
            .class_list()
            .toggle_with_force(PREVIEW_ACTIVE_CLASS, preview.open)
            .dom("toggle-file-preview")?;
        Ok(())
    }

    fn bubble_element(&self, bubble: &BubbleView) -> WebResult<Element> {
        let document = &self.dom.document;
        let create = |tag: &str, class_name: &str| -> WebResult<Element> {
            let element = document.create_element(tag).dom("create-bubble")?;
            element.set_class_name(class_name);
            Ok(element)
        };

        let root = create("div", &bubble.class_name)?;
        let content = create("div", "message-content")?;

        match &bubble.content {
            BubbleContent::Paragraphs(paragraphs) => {
                for paragraph in paragraphs {
                    let p = document.create_element("p").dom("create-paragraph")?;
                    p.set_text_content(Some(paragraph.as_str()));
                    content.append_child(&p).dom("append-paragraph")?;
                }
            }
            BubbleContent::File { icon_class, name } => {
                let file_message = create("div", "file-message")?;
                let icon = create("i", icon_class)?;
                let file_name = create("span", "file-name")?;
                file_name.set_text_content(Some(name.as_str()));
                file_message.append_child(&icon).dom("append-file-icon")?;
                file_message
                    .append_child(&file_name)
                    .dom("append-file-name")?;
                content.append_child(&file_message).dom("append-file")?;
            }
            BubbleContent::TypingDots(count) => {
                for _ in 0..*count {
                    let dot = document.create_element("span").dom("create-typing-dot")?;
                    content.append_child(&dot).dom("append-typing-dot")?;
                }
            }
        }

        root.append_child(&content).dom("append-bubble-content")?;
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use medchat_widget::chat::{MessageId, PreviewView};
    use medchat_widget::Sender;

    use super::*;

    fn bubble(id: u64, text: &str) -> BubbleView {
        BubbleView {
            id: Some(MessageId::new(id)),
            sender: Sender::User,
            class_name: "message user".to_string(),
            content: BubbleContent::Paragraphs(vec![text.to_string()]),
        }
    }

    fn typing() -> BubbleView {
        BubbleView {
            id: None,
            sender: Sender::Bot,
            class_name: "message bot typing-indicator".to_string(),
            content: BubbleContent::TypingDots(3),
        }
    }

    #[test]
    fn unchanged_view_yields_empty_patch() {
        let mut painted = PaintedState::default();
        let view = WidgetView {
            transcript: vec![bubble(1, "hello")],
            ..WidgetView::default()
        };

        assert_eq!(painted.advance(&view).new_bubbles.len(), 1);
        assert!(painted.advance(&view).is_empty());
    }

    #[test]
    fn typing_toggles_once_per_transition() {
        let mut painted = PaintedState::default();
        let waiting = WidgetView {
            transcript: vec![bubble(1, "hello")],
            typing: Some(typing()),
            ..WidgetView::default()
        };
        let patch = painted.advance(&waiting);
        assert_eq!(patch.typing, Some(Some(&typing())));

        let mut answered = waiting.clone();
        answered.typing = None;
        answered.transcript.push(bubble(2, "hi"));
        let patch = painted.advance(&answered);
        assert_eq!(patch.typing, Some(None));
        assert_eq!(patch.new_bubbles, &answered.transcript[1..]);
    }

    #[test]
    fn draft_is_written_only_when_it_changes() {
        let mut painted = PaintedState::default();
        let mut view = WidgetView {
            draft: "what is my A1c?".to_string(),
            ..WidgetView::default()
        };
        assert_eq!(painted.advance(&view).draft, Some("what is my A1c?"));

        view.draft.clear();
        assert_eq!(painted.advance(&view).draft, Some(""));

        view.upload_status = "Uploading...".to_string();
        let patch = painted.advance(&view);
        assert_eq!(patch.draft, None);
        assert_eq!(patch.upload_status, Some("Uploading..."));
    }

    #[test]
    fn preview_and_indicator_changes_are_reported() {
        let mut painted = PaintedState::default();
        let view = WidgetView {
            preview: PreviewView {
                open: true,
                file_info: "labs.pdf".to_string(),
                file_content: Some("Hemoglobin 10.9 g/dL".to_string()),
                image_src: None,
            },
            indicator: IndicatorView {
                visible: true,
                filename: "labs.pdf".to_string(),
            },
            ..WidgetView::default()
        };

        let patch = painted.advance(&view);
        assert_eq!(patch.preview, Some(&view.preview));
        assert_eq!(patch.indicator.map(IndicatorView::display), Some("flex"));
    }
}
