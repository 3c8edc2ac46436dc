//! Alteration notifier
//!
//! A chat-bot plugin that announces plugin loads and unloads to group chats
//! and warns users who invoke commands whose plugin has been removed.

#![forbid(unsafe_code)]

pub mod adapter;
pub mod core;
pub mod driver;
pub mod notifier;
pub mod prelude;
pub mod runtime;

pub use notifier::AlterationNotifier;
pub use runtime::Runtime;
