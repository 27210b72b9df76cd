//! PublishManager - connection lifecycle and publish state machine
//!
//! The manager owns at most one client per destination and drives it
//! through three states:
//!
//! ```text
//!                 create + probe ok
//!  Disconnected ─────────────────────▶ Connected ◀──┐
//!       ▲                                 │         │ probe / send ok
//!       │ close()                         │ probe / │
//!       │                                 │ send    │
//!       │                                 ▼ failure │
//!       └──────────── close() ─────────  Stale ─────┘
//! ```
//!
//! A stale client is closed (errors swallowed) and replaced on the next
//! publish. Health checks probe a held client but never replace it.
//!
//! ## Outcomes
//!
//! `publish` returns `bool`, `publish_event` returns a [`PublishOutcome`],
//! `check_health` returns a [`HealthSnapshot`]. None of them fail; only an
//! explicit `close()` can return an error.

mod manager;
mod outcome;
mod state;

pub use manager::{CloseMode, PublishManager};
pub use outcome::{HealthSnapshot, PublishOutcome, RejectReason};
pub use state::ConnectionStatus;
