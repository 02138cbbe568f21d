use crate::error::Result;
use crate::gate::Preferences;

pub const PREFERENCES_PATH: &str = "/user/baseData";

/// Where the preferences fetch currently stands. Only `Loaded` opens gates.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PreferencesState {
    #[default]
    Pending,
    Loaded(Preferences),
    Failed(String),
}

impl PreferencesState {
    pub fn from_result(result: Result<Preferences>) -> Self {
        match result {
            Ok(preferences) => PreferencesState::Loaded(preferences),
            Err(err) => {
                log::warn!("preferences unavailable: {}", err);
                PreferencesState::Failed(err.to_string())
            }
        }
    }

    pub fn as_loaded(&self) -> Option<&Preferences> {
        match self {
            PreferencesState::Loaded(preferences) => Some(preferences),
            PreferencesState::Pending | PreferencesState::Failed(_) => None,
        }
    }
}

pub fn preferences_url(api_base: &str) -> String {
    format!("{}{}", api_base.trim_end_matches('/'), PREFERENCES_PATH)
}

pub async fn fetch_preferences(
    client: &reqwest::Client,
    api_base: &str,
    auth: &str,
) -> Result<Preferences> {
    let preferences = client
        .get(preferences_url(api_base))
        .bearer_auth(auth)
        .send()
        .await?
        .error_for_status()?
        .json::<Preferences>()
        .await?;
    Ok(preferences)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_loaded_preferences_reach_the_gate() {
        assert!(PreferencesState::Pending.as_loaded().is_none());
        assert!(PreferencesState::Failed("timeout".into()).as_loaded().is_none());

        let loaded = PreferencesState::Loaded(Preferences::all_enabled());
        assert_eq!(loaded.as_loaded(), Some(&Preferences::all_enabled()));
    }

    #[test]
    fn url_joins_without_double_slash() {
        assert_eq!(
            preferences_url("http://localhost:9002/"),
            "http://localhost:9002/user/baseData"
        );
    }
}
