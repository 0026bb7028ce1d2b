use std::time::Duration;

use futures::future::LocalBoxFuture;
use js_sys::Promise;
use medchat_widget::Sleeper;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

/// Sleeps through `window.setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutSleeper;

impl Sleeper for TimeoutSleeper {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let millis = timeout_millis(duration);
        let promise = Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|window| {
                window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
            });
            if !matches!(scheduled, Some(Ok(_))) {
                tracing::warn!(millis, "setTimeout unavailable, resolving immediately");
                let _ = resolve.call0(&JsValue::NULL);
            }
        });

        Box::pin(async move {
            let _ = JsFuture::from(promise).await;
        })
    }
}

/// `setTimeout` takes an `i32` of milliseconds.
fn timeout_millis(duration: Duration) -> i32 {
    i32::try_from(duration.as_millis()).unwrap_or(i32::MAX)
}
