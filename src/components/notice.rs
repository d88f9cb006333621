//! Transient Notice
//!
//! Single-slot success/error message with a fixed auto-dismiss delay. A
//! newer notice replaces the slot and restarts the clock; the dismiss for a
//! replaced notice must not clear its successor, which is what the
//! generation number guards.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::models::{Notice, NoticeKind};

pub const NOTICE_DISMISS_MS: u32 = 3_000;

/// The slot itself, kept free of timers so it can be unit tested
#[derive(Clone, Default, PartialEq)]
pub struct NoticeSlot {
    current: Option<Notice>,
    generation: u64,
}

impl NoticeSlot {
    /// Display `notice`, returning the generation its dismissal must name.
    pub fn show(&mut self, notice: Notice) -> u64 {
        self.generation += 1;
        self.current = Some(notice);
        self.generation
    }

    /// Clear the slot, but only if `generation` still identifies the
    /// displayed notice.
    pub fn dismiss(&mut self, generation: u64) {
        if self.generation == generation {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }
}

/// Slot signal plus a callback that shows a notice and schedules its
/// auto-dismiss after [`NOTICE_DISMISS_MS`].
pub fn use_notice() -> (RwSignal<NoticeSlot>, Callback<Notice>) {
    let slot = RwSignal::new(NoticeSlot::default());
    let show = Callback::new(move |notice: Notice| {
        let generation = slot.try_update(|s| s.show(notice)).unwrap_or_default();
        spawn_local(async move {
            TimeoutFuture::new(NOTICE_DISMISS_MS).await;
            // try_update: the page may be gone by the time the timer fires.
            let _ = slot.try_update(|s| s.dismiss(generation));
        });
    });
    (slot, show)
}

#[component]
pub fn NoticeBanner(slot: RwSignal<NoticeSlot>) -> impl IntoView {
    view! {
        {move || {
            slot.get().current().cloned().map(|notice| {
                let class = match notice.kind {
                    NoticeKind::Success => "notice notice-success",
                    NoticeKind::Error => "notice notice-error",
                };
                view! { <div class=class>{notice.text}</div> }
            })
        }}
    }
}
