//! Merchant dashboard client: a resource client over the dashboard API, a
//! stale-while-revalidate fetch cache, typed per-resource accessors, the
//! price list CSV export, and a terminal UI over all of it.

pub mod api;
pub mod app;
pub mod cache;
pub mod commands;
pub mod config;
pub mod event;
pub mod export;
pub mod logging;
pub mod resources;
pub mod ui;
