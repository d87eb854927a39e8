//! IVI Shell - surface roles, output layout and policy
//!
//! This module decides, for every application surface a client creates,
//! where it appears, how it is sized, which layer it occupies and when it
//! becomes visible.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Host Compositor / Clients                   │
//! │  (desktop surfaces, shell + desktop protocol, head hotplug) │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ mpsc::Sender<ShellMessage>
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Shell Actor                            │
//! │  - Owns the Shell, processes messages sequentially          │
//! │  - Policy timers post back into the same channel            │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ &mut Shell
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Shell                               │
//! │  registry · pending queues · outputs · layout · policy      │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ Vec<ShellEffect>
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Effect Executor                          │
//! │  - view capability, client configure, protocol events       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod actor;
mod bridge;
pub mod effects;
pub mod error;
mod layout;
pub mod outputs;
pub mod pending;
pub mod policy;
#[allow(clippy::module_inception)]
mod shell;
pub mod state;

pub use actor::{ActorError, ShellActor, ShellActorHandle, ShellMessage, ShellQuery};
pub use effects::{EffectExecutor, RecordingExecutor, ShellEffect, ShellEvent};
pub use error::{ProtocolErrorCode, ShellError, ShellResult};
pub use shell::{Shell, ShellSnapshot};
