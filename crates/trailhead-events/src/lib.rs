//! Named-channel pub/sub for the Trailhead campaign simulation.
//!
//! [`ListenerBus`] is the notification layer between the campaign state
//! machine and its observers (scenes, telemetry, loggers). Each state
//! machine instance owns its own bus -- there is deliberately no global
//! listener map, so independent instances never leak handlers into each
//! other.
//!
//! # Delivery guarantees
//!
//! - Emission is synchronous: every handler registered on the channel is
//!   invoked, in registration order, before [`ListenerBus::emit`] returns.
//! - Handlers receive the notification payload plus a reference to the
//!   current campaign state.
//! - Handlers must not register or remove handlers for the channel being
//!   emitted; the bus snapshots nothing mid-emission, so doing so has
//!   undefined ordering.
//! - There is no cross-channel ordering guarantee.

pub mod bus;

pub use bus::{Handler, ListenerBus, SubscriptionId};
