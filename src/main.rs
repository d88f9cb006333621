//! Taskpad Frontend Entry Point

mod app;
mod backend;
mod components;
mod config;
mod context;
mod epoch;
mod models;
mod pages;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    mount_to_body(App);
}
