//! CacheFly State Management
//!
//! Persists what the provider host knows about managed resources:
//!
//! - **StateFile**: serial, lineage and every managed resource's attributes
//! - **StateBackend**: storage for the state file plus a lock for exclusive access
//! - **LocalBackend**: JSON file on disk with a `.lock` file beside it
//!
//! # Example
//!
//! ```ignore
//! use cachefly_state::{LocalBackend, StateBackend, StateFile};
//!
//! let backend = LocalBackend::new();
//! let lock = backend.acquire_lock("apply").await?;
//!
//! let mut state = backend.read_state().await?.unwrap_or_default();
//! // ... record provider results ...
//! state.increment_serial();
//! backend.write_state(&state).await?;
//!
//! backend.release_lock(&lock).await?;
//! ```

pub mod backend;
pub mod local;
pub mod lock;
pub mod state;

pub use backend::{BackendError, BackendResult, StateBackend};
pub use local::LocalBackend;
pub use lock::LockInfo;
pub use state::{ResourceState, StateFile};
