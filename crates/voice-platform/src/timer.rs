//! Browser scheduling: timeouts, animation frames and local task spawning.

use std::time::Duration;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

use voice_core::ports::{SpawnPort, TimerPort};

pub struct BrowserTimer;

impl TimerPort for BrowserTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(millis).boxed_local()
    }

    fn next_frame(&self) -> LocalBoxFuture<'static, ()> {
        let frame = js_sys::Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window()
                .map(|window| window.request_animation_frame(&resolve).is_ok())
                .unwrap_or(false);
            // No window (worker or test runner): resolve on the microtask queue
            if !scheduled {
                let _ = resolve.call0(&JsValue::NULL);
            }
        });
        async move {
            let _ = JsFuture::from(frame).await;
        }
        .boxed_local()
    }
}

pub struct BrowserSpawner;

impl SpawnPort for BrowserSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
