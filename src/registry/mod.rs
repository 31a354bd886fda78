//! Connection registry: who is reachable, and through which connection.
//!
//! The registry holds the single authoritative mapping from client
//! identifier to live connection. Registration overwrites (last writer
//! wins), removal is identity-checked, and nothing survives a process
//! restart.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<ClientRegistry>
//!                  ┌──────────────────────────────┐
//!                  │ clients: HashMap<ClientId,   │
//!                  │   ClientEntry {              │
//!                  │     handle: ConnectionHandle,│
//!                  │     metadata,                │
//!                  │   }                          │
//!                  │ >                            │
//!                  └──────────────┬───────────────┘
//!                                 │
//!            register ───────────►│◄─────────── lookup
//!            (router, on          │             (delivery engine,
//!             "register" frames)  │              per relayed frame)
//!                                 │
//!            remove ─────────────►│
//!            (connection close,
//!             identity-checked)
//! ```
//!
//! Entries hold a clone of the connection's send handle, not the socket:
//! the transport owns connection lifecycles, the registry only routes.

pub mod entry;
pub mod store;

pub use entry::{ClientEntry, ClientId, ClientInfo};
pub use store::ClientRegistry;
