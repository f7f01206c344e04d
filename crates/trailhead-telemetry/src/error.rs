//! Error types for telemetry and leaderboard calls.

/// Errors raised by the telemetry collaborators.
///
/// These never propagate into campaign state; callers log them and render
/// a degraded result.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The HTTP request failed in transport or decoding.
    #[error("telemetry request failed: {source}")]
    Http {
        /// The underlying client error.
        #[from]
        source: reqwest::Error,
    },

    /// No endpoint is configured for the call.
    #[error("telemetry endpoint not configured")]
    MissingEndpoint,

    /// The collector rejected the submission as conflicting (immutable
    /// field change or stale submission counter).
    #[error("telemetry submission conflict")]
    Conflict,

    /// A newer fetch superseded this one; the response must be discarded.
    #[error("response superseded by a newer fetch")]
    Stale,
}
