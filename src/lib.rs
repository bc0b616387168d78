//! DrivUp chat client core.
//!
//! Conversation state, the real-time channel, and the timeline pipeline that
//! turns a conversation into the rows of the passenger/driver chat view.

pub mod clock;
pub mod config;
pub mod conversation;
pub mod events;
pub mod logging;
pub mod message;
pub mod protocol;
pub mod realtime;
pub mod state;
pub mod timeline;
pub mod validation;

#[cfg(test)]
mod integration_tests;
