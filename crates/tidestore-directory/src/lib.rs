//! tidestore metadata directory
//!
//! The single authoritative filename -> record table and the HTTP server
//! that exposes it. All state is in-memory and lives exactly as long as
//! the process; durability is out of scope by design.

pub mod server;
pub mod table;

pub use server::DirectoryServer;
pub use table::FileTable;
