#![forbid(unsafe_code)]

//! Widgets for tipkit.
//!
//! Each widget is a [`CustomElement`](tipkit_runtime::CustomElement) with a
//! `define` helper that registers it with a [`Host`](tipkit_runtime::Host).

pub mod tooltip;

pub use tooltip::{ConfigError, TooltipConfig, TooltipWidget};
