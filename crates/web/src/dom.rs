//! Lookup of the widget's fixed elements and the injected active-file bar.

use snafu::OptionExt;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlImageElement, HtmlInputElement};

use crate::error::{JsResultExt, MissingElementSnafu, UnexpectedElementSnafu, WebResult};

pub const CHAT_BOX_ID: &str = "chatBox";
pub const USER_INPUT_ID: &str = "userInput";
pub const SEND_BUTTON_ID: &str = "sendBtn";
pub const FILE_UPLOAD_ID: &str = "fileUpload";
pub const UPLOAD_STATUS_ID: &str = "uploadStatus";
pub const FILE_PREVIEW_ID: &str = "filePreview";
pub const FILE_INFO_ID: &str = "fileInfo";
pub const FILE_CONTENT_ID: &str = "fileContent";
pub const IMAGE_PREVIEW_ID: &str = "imagePreview";
pub const CLOSE_PREVIEW_ID: &str = "closePreview";
pub const ACTIVE_FILE_NAME_ID: &str = "activeFileName";
pub const CLEAR_FILE_BUTTON_ID: &str = "clearFileBtn";
pub const TYPING_INDICATOR_ID: &str = "typingIndicator";

const CHAT_CONTAINER_SELECTOR: &str = ".chat-container";
const ACTIVE_FILE_INDICATOR_CLASS: &str = "active-file-indicator";
const ACTIVE_FILE_INDICATOR_HTML: &str = concat!(
    r#"<span class="active-file-text">Active File: <span id="activeFileName"></span></span> "#,
    r#"<button id="clearFileBtn" class="clear-file-btn">×</button>"#,
);

/// Handles to every element the widget reads or paints.
///
/// `uploadBtn` is only a label for the hidden file input and is never touched.
pub struct WidgetDom {
    pub document: Document,
    pub chat_box: Element,
    pub user_input: HtmlInputElement,
    pub send_button: Element,
    pub file_upload: HtmlInputElement,
    pub upload_status: Element,
    pub file_preview: Element,
    pub file_info: Element,
    pub file_content: Element,
    pub image_preview: HtmlImageElement,
    pub close_preview: Element,
    pub active_file_indicator: HtmlElement,
    pub active_file_name: Element,
    pub clear_file_button: Element,
}

impl WidgetDom {
    /// Resolves the fixed IDs and inserts the hidden active-file bar above the chat box.
    pub fn bind(document: Document) -> WebResult<Self> {
        let chat_box = element(&document, CHAT_BOX_ID)?;
        let active_file_indicator = inject_active_file_indicator(&document, &chat_box)?;

        Ok(Self {
            user_input: typed(&document, USER_INPUT_ID, "input")?,
            send_button: element(&document, SEND_BUTTON_ID)?,
            file_upload: typed(&document, FILE_UPLOAD_ID, "input")?,
            upload_status: element(&document, UPLOAD_STATUS_ID)?,
            file_preview: element(&document, FILE_PREVIEW_ID)?,
            file_info: element(&document, FILE_INFO_ID)?,
            file_content: element(&document, FILE_CONTENT_ID)?,
            image_preview: typed(&document, IMAGE_PREVIEW_ID, "img")?,
            close_preview: element(&document, CLOSE_PREVIEW_ID)?,
            active_file_name: element(&document, ACTIVE_FILE_NAME_ID)?,
            clear_file_button: element(&document, CLEAR_FILE_BUTTON_ID)?,
            active_file_indicator,
            chat_box,
            document,
        })
    }
}

fn element(document: &Document, id: &str) -> WebResult<Element> {
    document.get_element_by_id(id).context(MissingElementSnafu {
        stage: "lookup-element",
        selector: format!("#{id}"),
    })
}

fn typed<T: JsCast>(document: &Document, id: &str, expected: &'static str) -> WebResult<T> {
    element(document, id)?
        .dyn_into::<T>()
        .ok()
        .context(UnexpectedElementSnafu {
            stage: "cast-element",
            selector: format!("#{id}"),
            expected,
        })
}

fn inject_active_file_indicator(document: &Document, chat_box: &Element) -> WebResult<HtmlElement> {
    let container = document
        .query_selector(CHAT_CONTAINER_SELECTOR)
        .dom("query-chat-container")?
        .context(MissingElementSnafu {
            stage: "inject-active-file-indicator",
            selector: CHAT_CONTAINER_SELECTOR,
        })?;

    let indicator = document
        .create_element("div")
        .dom("create-active-file-indicator")?
        .dyn_into::<HtmlElement>()
        .ok()
        .context(UnexpectedElementSnafu {
            stage: "inject-active-file-indicator",
            selector: ACTIVE_FILE_INDICATOR_CLASS,
            expected: "div",
        })?;
    indicator.set_class_name(ACTIVE_FILE_INDICATOR_CLASS);
    indicator.set_inner_html(ACTIVE_FILE_INDICATOR_HTML);
    indicator
        .style()
        .set_property("display", "none")
        .dom("hide-active-file-indicator")?;

    container
        .insert_before(&indicator, Some(chat_box))
        .dom("insert-active-file-indicator")?;
    Ok(indicator)
}
