//! Shared type definitions for the Trailhead campaign simulation.
//!
//! This crate is the single source of truth for all types used across the
//! Trailhead workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the browser view layer.
//!
//! # Modules
//!
//! - [`state`] -- The campaign state record and its component types
//! - [`catalog`] -- Externally supplied catalogs (events, roles, prompts)
//! - [`notification`] -- Notification channels and payloads for the bus

pub mod catalog;
pub mod notification;
pub mod state;

// Re-export all public types at crate root for convenience.
pub use catalog::{
    EventCatalog, EventConditions, EventDefinition, EventEffects, PromptCatalog, RoleOption,
    RoleSelectionPrompts,
};
pub use notification::{Channel, Notification};
pub use state::{
    CampaignPhase, CampaignState, FailureReason, LogEntry, LogKind, Role, StaffMember, Timeline,
};
