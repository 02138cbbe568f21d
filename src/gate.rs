//! Per-overlay subscription gate.
//!
//! A gated overlay only opens its live channel when the streamer enabled it
//! in their preferences. Missing preferences keep the gate closed.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    MinimapOverlay,
    VoteDistributionOverlay,
    VoteToplistOverlay,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::MinimapOverlay,
        Capability::VoteDistributionOverlay,
        Capability::VoteToplistOverlay,
    ];

    /// Field name in the preferences record.
    pub fn field_name(self) -> &'static str {
        match self {
            Capability::MinimapOverlay => "useMinimapOverlay",
            Capability::VoteDistributionOverlay => "useVoteDistributionOverlay",
            Capability::VoteToplistOverlay => "useVoteToplistOverlay",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.field_name() == s)
            .ok_or_else(|| format!("unknown overlay capability: {s}"))
    }
}

/// Overlay toggles from the streamer's account. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, deserialize_with = "truthy")]
    pub use_minimap_overlay: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub use_vote_distribution_overlay: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub use_vote_toplist_overlay: bool,
}

impl Preferences {
    pub fn all_enabled() -> Self {
        Self {
            use_minimap_overlay: true,
            use_vote_distribution_overlay: true,
            use_vote_toplist_overlay: true,
        }
    }

    pub fn is_enabled(&self, capability: Capability) -> bool {
        match capability {
            Capability::MinimapOverlay => self.use_minimap_overlay,
            Capability::VoteDistributionOverlay => self.use_vote_distribution_overlay,
            Capability::VoteToplistOverlay => self.use_vote_toplist_overlay,
        }
    }
}

// The account service stores these flags as tinyint columns, so 0/1 arrive
// alongside proper booleans.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

pub fn gate(preferences: Option<&Preferences>, capability: Capability) -> bool {
    preferences.is_some_and(|p| p.is_enabled(capability))
}

pub fn gate_by_name(preferences: Option<&Preferences>, name: &str) -> bool {
    match name.parse::<Capability>() {
        Ok(capability) => gate(preferences, capability),
        Err(_) => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    GameState,
    Betting,
}

impl ChannelKind {
    pub fn path(self) -> &'static str {
        match self {
            ChannelKind::GameState => "/dota-gsi/live/",
            ChannelKind::Betting => "/bets/live/",
        }
    }

    pub fn url(self, base: &str, auth: &str) -> String {
        format!("{}{}{}", base.trim_end_matches('/'), self.path(), auth)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Overlay {
    DotaStats,
    AntiSnipe,
    VoteSlider,
    VoteToplist,
}

impl Overlay {
    /// Preference that has to be on before the channel opens. `None` means
    /// the overlay is always allowed.
    pub fn capability(self) -> Option<Capability> {
        match self {
            Overlay::DotaStats => None,
            Overlay::AntiSnipe => Some(Capability::MinimapOverlay),
            Overlay::VoteSlider => Some(Capability::VoteDistributionOverlay),
            Overlay::VoteToplist => Some(Capability::VoteToplistOverlay),
        }
    }

    pub fn channel(self) -> ChannelKind {
        match self {
            Overlay::DotaStats | Overlay::AntiSnipe => ChannelKind::GameState,
            Overlay::VoteSlider | Overlay::VoteToplist => ChannelKind::Betting,
        }
    }

    pub fn may_open(self, preferences: Option<&Preferences>) -> bool {
        match self.capability() {
            Some(capability) => gate(preferences, capability),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prefs(value: serde_json::Value) -> Preferences {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn absent_preferences_keep_every_gate_closed() {
        for capability in Capability::ALL {
            assert!(!gate(None, capability));
            assert!(!gate_by_name(None, capability.field_name()));
        }
    }

    #[test]
    fn gate_follows_the_matching_field() {
        let on = prefs(json!({"useMinimapOverlay": true}));
        let off = prefs(json!({"useMinimapOverlay": false}));

        assert!(gate_by_name(Some(&on), "useMinimapOverlay"));
        assert!(!gate_by_name(Some(&off), "useMinimapOverlay"));
        assert!(!gate(Some(&on), Capability::VoteToplistOverlay));
    }

    #[test]
    fn unknown_capability_name_is_closed() {
        let all = Preferences::all_enabled();
        assert!(!gate_by_name(Some(&all), "useKillfeedOverlay"));
    }

    #[test]
    fn flags_use_loose_truthiness() {
        let p = prefs(json!({
            "id": 12,
            "displayName": "caster",
            "useMinimapOverlay": 1,
            "useVoteDistributionOverlay": 0,
            "useVoteToplistOverlay": null,
        }));
        assert!(p.use_minimap_overlay);
        assert!(!p.use_vote_distribution_overlay);
        assert!(!p.use_vote_toplist_overlay);
    }

    #[test]
    fn ungated_overlay_ignores_preferences() {
        assert!(Overlay::DotaStats.may_open(None));
        assert!(!Overlay::AntiSnipe.may_open(None));
        assert!(!Overlay::VoteSlider.may_open(Some(&Preferences::default())));
        assert!(Overlay::VoteToplist.may_open(Some(&Preferences::all_enabled())));
    }

    #[test]
    fn channel_urls() {
        assert_eq!(
            ChannelKind::GameState.url("wss://api.example.com/", "tok"),
            "wss://api.example.com/dota-gsi/live/tok"
        );
        assert_eq!(Overlay::VoteSlider.channel().url("ws://h", "x"), "ws://h/bets/live/x");
    }
}
