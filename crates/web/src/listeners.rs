//! Browser events forwarded to the controller.
//!
//! Every handler spawns its async work on the page's event loop and returns, so a
//! send or upload in flight never blocks further input.

use std::rc::Rc;

use js_sys::Uint8Array;
use medchat_widget::UploadSource;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Event, EventTarget, File, KeyboardEvent};

use crate::Controller;
use crate::dom::WidgetDom;
use crate::error::{JsResultExt, WebResult, js_message};

pub fn attach(dom: &Rc<WidgetDom>, controller: &Rc<Controller>) -> WebResult<()> {
    {
        let dom = Rc::clone(dom);
        let controller = Rc::clone(controller);
        listen(&dom.send_button.clone(), "click", move |_| {
            submit_input(&dom, &controller);
        })?;
    }

    {
        let dom = Rc::clone(dom);
        let controller = Rc::clone(controller);
        listen(&dom.user_input.clone(), "keypress", move |event| {
            let is_enter = event
                .dyn_ref::<KeyboardEvent>()
                .is_some_and(|event| event.key() == "Enter");
            if is_enter {
                submit_input(&dom, &controller);
            }
        })?;
    }

    {
        let input = dom.file_upload.clone();
        let controller = Rc::clone(controller);
        listen(&dom.file_upload, "change", move |_| {
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            let controller = Rc::clone(&controller);
            spawn_local(async move {
                match read_file(&file).await {
                    Ok(source) => {
                        controller.upload_file(source).await;
                    }
                    Err(message) => {
                        tracing::error!(file_name = %file.name(), %message, "failed to read selected file");
                    }
                }
            });
        })?;
    }

    {
        let controller = Rc::clone(controller);
        listen(&dom.close_preview, "click", move |_| controller.close_preview())?;
    }

    {
        let controller = Rc::clone(controller);
        listen(&dom.clear_file_button, "click", move |_| {
            let controller = Rc::clone(&controller);
            spawn_local(async move { controller.clear_active_file().await });
        })?;
    }

    Ok(())
}

fn submit_input(dom: &WidgetDom, controller: &Rc<Controller>) {
    controller.set_draft(dom.user_input.value());
    let controller = Rc::clone(controller);
    spawn_local(async move {
        let outcome = controller.submit_draft().await;
        tracing::debug!(?outcome, "chat turn finished");
    });
}

async fn read_file(file: &File) -> Result<UploadSource, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|value| js_message(&value))?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    Ok(UploadSource::new(file.name(), bytes))
}

/// Registers `handler` for the lifetime of the page.
fn listen(
    target: &EventTarget,
    event: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> WebResult<()> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .dom("add-event-listener")?;
    closure.forget();
    Ok(())
}
