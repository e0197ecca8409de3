//! Primitive types shared by the wire format and the façade.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// `api-version` query parameter sent with every REST call.
///
/// Renders as `7.1`, or `7.1-preview.1` for preview resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
    /// Preview revision, if the resource is only published as a preview.
    pub preview: Option<u32>,
}

impl ApiVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            preview: None,
        }
    }

    pub fn preview(self, revision: u32) -> Self {
        Self {
            preview: Some(revision),
            ..self
        }
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::new(7, 1)
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(revision) = self.preview {
            write!(f, "-preview.{revision}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid api-version '{0}' (expected e.g. 7.1 or 7.1-preview.1)")]
pub struct ParseApiVersionError(String);

impl FromStr for ApiVersion {
    type Err = ParseApiVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseApiVersionError(s.to_string());
        let s = s.trim();

        let (release, preview) = match s.split_once("-preview") {
            Some((release, "")) => (release, Some(1)),
            Some((release, rest)) => {
                let revision = rest
                    .strip_prefix('.')
                    .and_then(|r| r.parse().ok())
                    .ok_or_else(invalid)?;
                (release, Some(revision))
            }
            None => (s, None),
        };

        let (major, minor) = release.split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
            preview,
        })
    }
}

/// Instant reported by the platform, e.g. a project's `lastUpdateTime`.
///
/// Accepts RFC 3339 and the offset-less `0001-01-01T00:00:00` form the
/// platform uses for projects that were never updated; the latter is read
/// as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => Ok(Self(dt.with_timezone(&Utc))),
            Err(rfc3339) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| Self(Utc.from_utc_datetime(&naive)))
                .map_err(|_| rfc3339),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_api_version_is_seven_one() {
        assert_eq!(ApiVersion::default().to_string(), "7.1");
        assert_eq!(ApiVersion::new(7, 1).preview(2).to_string(), "7.1-preview.2");
    }

    #[test]
    fn api_version_parses_release_and_preview_forms() {
        assert_eq!("7.0".parse::<ApiVersion>().unwrap(), ApiVersion::new(7, 0));
        assert_eq!(
            "7.1-preview".parse::<ApiVersion>().unwrap(),
            ApiVersion::new(7, 1).preview(1)
        );
        assert_eq!(
            " 6.0-preview.3 ".parse::<ApiVersion>().unwrap(),
            ApiVersion::new(6, 0).preview(3)
        );
        assert!("7".parse::<ApiVersion>().is_err());
        assert!("7.1-previewx".parse::<ApiVersion>().is_err());
        assert!("latest".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn timestamp_reads_platform_format() {
        let ts: Timestamp = serde_json::from_str("\"2024-03-05T10:11:12.347Z\"").unwrap();
        assert_eq!(ts.as_datetime().timestamp(), 1_709_633_472);
        assert_eq!(ts.to_string(), "2024-03-05T10:11:12Z");
    }

    #[test]
    fn timestamp_without_offset_is_read_as_utc() {
        let never: Timestamp = serde_json::from_str("\"0001-01-01T00:00:00\"").unwrap();
        assert_eq!(never.to_string(), "0001-01-01T00:00:00Z");

        let fractional: Timestamp = serde_json::from_str("\"2024-03-05T10:11:12.347\"").unwrap();
        assert_eq!(fractional.as_datetime().timestamp(), 1_709_633_472);

        let offset: Timestamp = serde_json::from_str("\"2024-03-05T11:11:12+01:00\"").unwrap();
        assert_eq!(offset.as_datetime().timestamp(), 1_709_633_472);

        assert!(serde_json::from_str::<Timestamp>("\"yesterday\"").is_err());
    }
}
