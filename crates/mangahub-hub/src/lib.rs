//! `mangahub-hub`: real-time chat fan-out.
//!
//! # Overview
//!
//! One [`Hub`] task owns the set of connected sinks and drains a single
//! ordered command queue. Every producer (WebSocket sessions, the UDP
//! notification listener, admin triggers) talks to it only through a
//! clonable [`HubHandle`], so registration, removal and broadcast are
//! processed one at a time in arrival order.
//!
//! | Command      | Effect                                                   |
//! |--------------|----------------------------------------------------------|
//! | `Register`   | Insert a client; the hub now owns its transport          |
//! | `Unregister` | Remove and close a client; no-op when already gone       |
//! | `Broadcast`  | Write one payload to every client, evicting failures     |
//! | `Stats`      | Report the client count at this point in the order       |

pub mod client;
pub mod error;
pub mod handle;
pub mod hub;
mod registry;
pub mod udp;

pub use client::{Client, ClientId, Sink};
pub use error::{HubError, Result, SinkError};
pub use handle::{DeliveryReport, HubHandle, HubStats};
pub use hub::Hub;
pub use udp::{UdpIngress, UdpNotifier};
