//! Browser binding for the medchat widget.
//!
//! Mounts [`medchat_widget::ChatWidgetController`] on the chat page: looks up the
//! fixed element IDs, wires their events and paints every snapshot back to the DOM.

use std::cell::RefCell;
use std::rc::Rc;

use medchat_widget::{ChatWidgetController, HttpChatApi, WidgetSettings, WidgetView};
use snafu::{OptionExt, ResultExt};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod dom;
mod error;
mod listeners;
mod painter;
mod timer;

pub use dom::WidgetDom;
pub use error::{WebError, WebResult};
pub use painter::{DomPainter, PaintedState, Patch};
pub use timer::TimeoutSleeper;

use error::{ClientSnafu, JsResultExt, NoWindowSnafu};

pub(crate) type Controller = ChatWidgetController<HttpChatApi, TimeoutSleeper>;

/// Initialize WASM module
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    mount()?;
    log::info!("medchat widget mounted");
    Ok(())
}

fn mount() -> WebResult<()> {
    let window = web_sys::window().context(NoWindowSnafu { stage: "mount" })?;
    let document = window.document().context(NoWindowSnafu {
        stage: "mount-document",
    })?;

    // Same-origin backend; the session cookie rides along with every request.
    let origin = window.location().origin().dom("read-origin")?;
    let settings = WidgetSettings::with_base_url(origin);
    let api = HttpChatApi::new(&settings).context(ClientSnafu {
        stage: "build-http-client",
    })?;
    let controller: Rc<Controller> = Rc::new(
        ChatWidgetController::new(api, TimeoutSleeper)
            .with_status_clear_delay(settings.status_clear_delay()),
    );

    let dom = Rc::new(WidgetDom::bind(document)?);
    let painter = RefCell::new(DomPainter::new(Rc::clone(&dom)));
    controller.set_observer(Rc::new(move |view: &WidgetView| {
        if let Err(error) = painter.borrow_mut().paint(view) {
            log::error!("failed to paint widget: {error}");
        }
    }));

    listeners::attach(&dom, &controller)?;

    let restoring = Rc::clone(&controller);
    spawn_local(async move { restoring.sync_active_file_on_load().await });

    dom.user_input.focus().dom("focus-input")?;
    Ok(())
}
