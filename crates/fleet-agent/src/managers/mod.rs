//! Stateful managers for the fleet agent
//!
//! This module contains the components that own agent state or drive
//! external collaborators on behalf of an RPC.

pub mod policy;
pub mod subscriptions;

pub use policy::PolicyBridge;
pub use subscriptions::{MembershipReport, SubscriptionReconciler};
