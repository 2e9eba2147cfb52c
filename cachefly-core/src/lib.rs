//! CacheFly Core
//!
//! Provider framework for the CacheFly provider: typed attribute values,
//! schemas with plan modifiers, diagnostics, planning and plan execution.

pub mod diagnostics;
pub mod differ;
pub mod interpreter;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod schema;
