//! Realtime Change Feed
//!
//! Phoenix-channel websocket against the backend's realtime endpoint. Joins
//! the task table's topic and fires the caller's callback on every row
//! event; the caller reacts by reloading, so payloads are never inspected
//! beyond the event kind.

use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

use super::TaskSubscription;

const TASKS_TOPIC: &str = "realtime:public:tasks";
const HEARTBEAT_MS: u32 = 30_000;

/// Open the feed. The returned handle closes the socket on drop.
pub fn subscribe(ws_url: &str, on_change: Rc<dyn Fn()>) -> TaskSubscription {
    let ws = match WebSocket::new(ws_url) {
        Ok(ws) => ws,
        Err(e) => {
            log::error!("change feed socket failed to open: {:?}", e);
            return TaskSubscription::noop();
        }
    };
    let alive = Rc::new(Cell::new(true));

    // Join the task topic once the socket is up.
    let ws_open = ws.clone();
    let onopen = Closure::wrap(Box::new(move |_: web_sys::Event| {
        log::info!("change feed connected");
        let join = serde_json::json!({
            "topic": TASKS_TOPIC,
            "event": "phx_join",
            "payload": {
                "config": {
                    "postgres_changes": [
                        { "event": "*", "schema": "public", "table": "tasks" }
                    ]
                }
            },
            "ref": "1",
        });
        if let Err(e) = ws_open.send_with_str(&join.to_string()) {
            log::error!("change feed join failed: {:?}", e);
        }
    }) as Box<dyn FnMut(_)>);
    ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    onopen.forget();

    let onmessage = Closure::wrap(Box::new(move |ev: MessageEvent| {
        if let Some(text) = ev.data().as_string() {
            if is_row_change(&text) {
                on_change();
            }
        }
    }) as Box<dyn FnMut(_)>);
    ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    let onerror = Closure::wrap(Box::new(move |e: ErrorEvent| {
        log::error!("change feed socket error: {:?}", e.message());
    }) as Box<dyn FnMut(_)>);
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    let onclose = Closure::wrap(Box::new(move |e: CloseEvent| {
        log::info!("change feed closed: code={}, reason={}", e.code(), e.reason());
    }) as Box<dyn FnMut(_)>);
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    onclose.forget();

    // Heartbeat keeps the phoenix connection from idling out.
    {
        let ws = ws.clone();
        let alive = Rc::clone(&alive);
        wasm_bindgen_futures::spawn_local(async move {
            let mut hb_ref = 2u64;
            loop {
                TimeoutFuture::new(HEARTBEAT_MS).await;
                if !alive.get() {
                    break;
                }
                let beat = serde_json::json!({
                    "topic": "phoenix",
                    "event": "heartbeat",
                    "payload": {},
                    "ref": hb_ref.to_string(),
                });
                if ws.send_with_str(&beat.to_string()).is_err() {
                    break;
                }
                hb_ref += 1;
            }
        });
    }

    TaskSubscription::new(move || {
        alive.set(false);
        if let Err(e) = ws.close() {
            log::warn!("change feed close failed: {:?}", e);
        } else {
            log::info!("change feed released");
        }
    })
}

/// True for any insert/update/delete frame on the task topic.
fn is_row_change(raw: &str) -> bool {
    let Ok(frame) = serde_json::from_str::<serde_json::Value>(raw) else {
        return false;
    };
    if frame.get("topic").and_then(|t| t.as_str()) != Some(TASKS_TOPIC) {
        return false;
    }
    matches!(
        frame.get("event").and_then(|e| e.as_str()),
        Some("postgres_changes" | "INSERT" | "UPDATE" | "DELETE")
    )
}
