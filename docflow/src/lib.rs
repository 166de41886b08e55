//! Core engine for the document forwarding workflow.
//!
//! Documents move between organizational units while two independent
//! status axes evolve: a lifecycle axis (draft, sent, deleted) driven by
//! owners, and an administrative axis driven by reviewing staff. The
//! crate allocates human-readable tracking codes, appends forwarding
//! history, and detects administrative status changes between sessions.
//!
//! The layout follows a hexagonal architecture: [`domain`] holds the
//! services and the ports they depend on, [`outbound`] holds the
//! driven-side adapters that implement those ports.

#![deny(missing_docs)]

pub mod domain;
pub mod outbound;
