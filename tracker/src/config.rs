use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Default base URL of the tracking endpoint.
pub const DEFAULT_TRACKER_URL: &str = "https://1111.xg4ken.com/";

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("tracker url must use http or https, got {0}")]
    UnsupportedScheme(String),

    #[error("tracker url cannot carry a query string")]
    TrackerUrlQuery,
}

/// Component settings, fixed for the lifetime of a pipeline instance.
///
/// Constructed once and passed by reference into every handler; there is
/// no ambient configuration lookup.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the tracking endpoint. A trailing slash is tolerated
    /// and normalized away when endpoints are composed.
    pub tracker_url: Url,

    /// Account token sent with conversion reports.
    pub profile_token: String,

    /// Enables the e-commerce listener. Off by default.
    pub ecommerce: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tracker_url: Url::parse(DEFAULT_TRACKER_URL).expect("default tracker url is valid"),
            profile_token: String::new(),
            ecommerce: false,
        }
    }
}

impl Settings {
    /// Validates the component settings
    pub fn validate(&self) -> Result<(), ValidationError> {
        let scheme = self.tracker_url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(ValidationError::UnsupportedScheme(scheme.to_string()));
        }

        if self.tracker_url.query().is_some() {
            return Err(ValidationError::TrackerUrlQuery);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.tracker_url.as_str(), DEFAULT_TRACKER_URL);
        assert_eq!(settings.profile_token, "");
        assert!(!settings.ecommerce);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_settings() {
        let settings: Settings = serde_json::from_value(serde_json::json!({
            "profile_token": "tok-1",
            "ecommerce": true,
        }))
        .unwrap();

        assert_eq!(settings.profile_token, "tok-1");
        assert!(settings.ecommerce);
        assert_eq!(settings.tracker_url.as_str(), DEFAULT_TRACKER_URL);
    }

    #[test]
    fn test_invalid_tracker_url_rejected_at_deserialization() {
        let result = serde_json::from_value::<Settings>(serde_json::json!({
            "tracker_url": "not-a-url",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_errors() {
        let mut settings = Settings::default();
        settings.tracker_url = Url::parse("ftp://tracker.example").unwrap();
        assert!(matches!(
            settings.validate().unwrap_err(),
            ValidationError::UnsupportedScheme(_)
        ));

        let mut settings = Settings::default();
        settings.tracker_url = Url::parse("https://tracker.example/?a=1").unwrap();
        assert!(matches!(
            settings.validate().unwrap_err(),
            ValidationError::TrackerUrlQuery
        ));
    }
}
