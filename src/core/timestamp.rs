//! Record time formatting
//!
//! Formats the `time` key of encoded records. The default is RFC 3339;
//! a custom strftime layout can be supplied at logger build time.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Time layout applied to every record a logger emits.
///
/// # Examples
///
/// ```
/// use service_kit::core::TimeLayout;
/// use chrono::Local;
///
/// let layout = TimeLayout::default();
/// let stamp = layout.format(&Local::now());
/// assert!(stamp.contains('T'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeLayout {
    /// RFC 3339 with offset: `2025-01-08T10:30:45+00:00`
    #[default]
    Rfc3339,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123`
    Iso8601Millis,

    /// Custom strftime layout
    ///
    /// ```
    /// use service_kit::core::TimeLayout;
    ///
    /// let layout = TimeLayout::Custom("%Y-%m-%d %H:%M:%S".to_string());
    /// ```
    Custom(String),
}

impl TimeLayout {
    /// Format a local timestamp according to this layout.
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimeLayout::Rfc3339 => datetime.to_rfc3339(),
            TimeLayout::Iso8601Millis => datetime.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            TimeLayout::Custom(layout) => datetime.format(layout).to_string(),
        }
    }
}

impl From<&str> for TimeLayout {
    fn from(layout: &str) -> Self {
        TimeLayout::Custom(layout.to_string())
    }
}

impl From<String> for TimeLayout {
    fn from(layout: String) -> Self {
        TimeLayout::Custom(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::milliseconds(123)
    }

    #[test]
    fn test_rfc3339() {
        let stamp = TimeLayout::Rfc3339.format(&fixed_datetime());
        assert!(stamp.starts_with("2025-01-08T10:30:45"));
    }

    #[test]
    fn test_iso8601_millis() {
        let stamp = TimeLayout::Iso8601Millis.format(&fixed_datetime());
        assert_eq!(stamp, "2025-01-08T10:30:45.123");
    }

    #[test]
    fn test_custom_layout() {
        let layout = TimeLayout::from("%Y/%m/%d");
        assert_eq!(layout.format(&fixed_datetime()), "2025/01/08");
    }

    #[test]
    fn test_default_is_rfc3339() {
        assert_eq!(TimeLayout::default(), TimeLayout::Rfc3339);
    }
}
