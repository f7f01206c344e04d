//! Campaign state machine and turn algorithm for the Trailhead simulation.
//!
//! This crate owns the campaign's single mutable state record and every
//! rule that touches it:
//!
//! - [`campaign`] -- the [`CampaignEngine`] state machine: mutators, the
//!   turn algorithm, failure/completion detection
//! - [`eligibility`] -- pure predicates and effect application over event
//!   definitions and state
//! - [`timeline`] -- calendar arithmetic for the campaign cursor
//! - [`rng`] -- injectable random source (deterministic in tests)
//! - [`clock`] -- injectable wall clock for log timestamps
//! - [`config`] -- engine tuning knobs and catalog loading
//!
//! All mutation is synchronous; notifications emitted for a mutator call are
//! fully delivered on the owned [`ListenerBus`](trailhead_events::ListenerBus)
//! before the call returns.
//!
//! [`CampaignEngine`]: campaign::CampaignEngine

pub mod campaign;
pub mod clock;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod rng;
pub mod timeline;

pub use campaign::{CampaignEngine, LaunchTimingOption, NewLogEntry, TurnOutcome, UsersProgress};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    CampaignConfig, CampaignTuning, EndpointsConfig, LoggingConfig, load_event_catalog,
    load_prompt_catalog,
};
pub use error::{CampaignError, ConfigError};
pub use rng::{RandomSource, SequenceRandomSource, ThreadRandomSource};
