//! `mangahub-lookup`: the internal catalogue lookup service.
//!
//! A small gRPC service (`mangahub.lookup.MangaLookup`) that answers
//! `GetManga` and `SearchManga` from the catalogue database. The REST
//! gateway resolves `/manga/{id}` and `/manga/search` through a
//! [`LookupClient`]; the service runs either embedded in the gateway or as
//! the standalone `mangahub-lookup` binary.

pub mod client;
pub mod error;
pub mod proto;
pub mod server;
pub mod service;

pub use client::LookupClient;
pub use error::{LookupError, Result};
pub use server::LookupServer;
pub use service::LookupService;
