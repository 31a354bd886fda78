//! Frame classification and best-effort delivery.
//!
//! Control flow for one inbound frame:
//!
//! ```text
//! transport line ──► MessageRouter::dispatch ──► ClientRegistry.register   ("register")
//!                                           └──► DeliveryEngine::forward   (relay kinds)
//!                                           └──► dropped with a log        (everything else)
//! ```

pub mod delivery;
pub mod router;

pub use delivery::{DeliveryEngine, DeliveryOutcome};
pub use router::MessageRouter;
