//! Festival Core Library
//!
//! Client-side logic for the festival chronicle application: notification
//! badges, chronicle links and uploads, popovers and table filters.

pub mod chronicle;
pub mod client;
pub mod config;
pub mod error;
pub mod html;
pub mod notification;
pub mod popover;
pub mod table;

pub use client::FestivalClient;
pub use config::Config;
pub use error::{FestivalError, FestivalResult};
