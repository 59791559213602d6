//! Integration tests for tidestore-client
//!
//! Uses wiremock to script directory and shard responses for the HTTP
//! adapters, and spins up real in-process servers for the end-to-end
//! reconciliation scenarios.

mod common;

mod test_directory_client;
mod test_end_to_end;
mod test_shard_client;
