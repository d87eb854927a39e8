//! Layout engine.
//!
//! Per surface, the state is its role crossed with mapped/unmapped. The
//! transitions are split by concern:
//!
//! - `resolve`: one-shot role resolution from the pending queues
//! - `commit`: per-role handling of client commits
//! - `activation`: activate, activation complete and deactivate
//! - `static_layout`: background and panel placement, usable area
//! - `view`: view and placeholder primitives that record effects

mod activation;
mod commit;
mod resolve;
mod static_layout;
mod view;
