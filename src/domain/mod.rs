//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, state machine, errors)
//! - `payment` - Pending payment lifecycle, audit entries and invoice documents

pub mod foundation;
pub mod payment;
