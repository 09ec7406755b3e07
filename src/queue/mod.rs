//! Lock-free FIFO queue.
//!
//! This module contains the Michael-Scott queue: an unbounded
//! singly-linked FIFO over tagged links, with a dummy node anchoring
//! `head` and `tail` so neither is ever null, and immediate node
//! reclamation guarded solely by the per-link tag counters.
//!
//! See [`MsQueue`] for the algorithm and ordering discussion.

mod ms;

pub use ms::MsQueue;
