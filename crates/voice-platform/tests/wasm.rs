//! WASM-target tests for voice-platform.
//!
//! Runs the adapters that need no network or media devices under
//! wasm32-unknown-unknown via `wasm-pack test --node`.
#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;
use futures::FutureExt;
use wasm_bindgen_test::*;

use voice_core::ports::{SpawnPort, TimerPort};
use voice_platform::timer::{BrowserSpawner, BrowserTimer};
use voice_platform::tools::WttrWeather;

#[wasm_bindgen_test]
fn weather_url_encodes_location() {
    let weather = WttrWeather::new();
    assert_eq!(
        weather.forecast_url("San Francisco, CA"),
        "https://wttr.in/San%20Francisco%2C%20CA?format=j1"
    );
}

#[wasm_bindgen_test]
fn weather_url_custom_base() {
    let weather = WttrWeather::with_base_url("http://localhost:8080/");
    assert_eq!(weather.forecast_url("Oslo"), "http://localhost:8080/Oslo?format=j1");
}

#[wasm_bindgen_test]
async fn timer_sleep_resolves() {
    BrowserTimer.sleep(Duration::from_millis(5)).await;
}

#[wasm_bindgen_test]
async fn timer_next_frame_resolves() {
    BrowserTimer.next_frame().await;
}

#[wasm_bindgen_test]
async fn spawner_runs_task() {
    let ran = Rc::new(Cell::new(false));
    let (tx, rx) = oneshot::channel();
    let flag = ran.clone();
    BrowserSpawner.spawn(
        async move {
            flag.set(true);
            let _ = tx.send(());
        }
        .boxed_local(),
    );
    rx.await.unwrap();
    assert!(ran.get());
}
