//! Wire protocol for tidestore
//!
//! The request/response bodies and URL routes spoken between the client
//! adapters and the directory/shard servers. Both sides depend on this
//! crate, so the two ends of the wire cannot drift apart.
//!
//! Transport is HTTP 1.1: JSON bodies for directory operations, raw octets
//! for block payloads.

pub mod routes;
pub mod wire;

pub use wire::{
    DeleteRequest, ErrorBody, ErrorCode, ModifyRequest, ModifyResponse, PutBlockResponse,
};
