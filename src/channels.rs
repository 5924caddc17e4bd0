// Canonical Channel Catalog for the mesh.
// Every node publishes and subscribes using these names; a deployment may
// collapse both onto one channel and multiplex by message kind.

/// Generic alerts: pump warnings, spread alerts, operator broadcasts.
pub const CHANNEL_ALERTS: &str = "global_alerts";

/// New token detections emitted by edge nodes.
pub const CHANNEL_NEW_TOKENS: &str = "new_tokens";

/// The channel set a receiving node subscribes to by default.
pub fn default_channels() -> Vec<String> {
    vec![CHANNEL_ALERTS.to_string(), CHANNEL_NEW_TOKENS.to_string()]
}
