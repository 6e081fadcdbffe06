//! Delivery lifecycle engine
//!
//! - `transition`: the closed status state machine
//! - `reconcile`: item quantity bookkeeping (pending reports and confirmation)
//! - `visibility`: which deliveries each role may see
//! - `engine`: role/ownership checks and persistence for every action

pub mod engine;
pub mod reconcile;
pub mod transition;
pub mod visibility;

pub use engine::DeliveryEngine;
pub use transition::{Action, ConfirmOutcome};
