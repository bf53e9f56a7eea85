//! `mangahub-sync`: point-to-point reading-progress relay.
//!
//! Each TCP connection carries exactly one JSON [`ProgressUpdate`]. The
//! server decodes it, hands it to a [`ProgressHandler`], and closes the
//! connection. There is no reply and no acknowledgement; malformed input is
//! dropped. This relay is independent of the chat hub.
//!
//! [`ProgressUpdate`]: mangahub_core::types::ProgressUpdate

pub mod client;
pub mod decode;
pub mod error;
pub mod handler;
pub mod server;

pub use client::send_progress;
pub use error::{Result, SyncError};
pub use handler::{LogProgressHandler, ProgressHandler};
pub use server::ProgressSyncServer;
