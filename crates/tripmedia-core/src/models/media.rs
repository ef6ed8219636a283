use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::error::AppError;

/// Media kind derived from extension and sniffed content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "media_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Unknown,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Unknown => "unknown",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Access tier of a media asset.
///
/// Stored as a Postgres enum; never empty at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "media_visibility", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Friends,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [Visibility::Public, Visibility::Private, Visibility::Friends];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "PUBLIC",
            Visibility::Private => "PRIVATE",
            Visibility::Friends => "FRIENDS",
        }
    }

    /// Parse an optional form value; a missing or blank value means `PUBLIC`.
    pub fn from_optional(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(str::trim) {
            None | Some("") => Ok(Visibility::default()),
            Some(v) => v.parse(),
        }
    }
}

impl FromStr for Visibility {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PUBLIC" => Ok(Visibility::Public),
            "PRIVATE" => Ok(Visibility::Private),
            "FRIENDS" => Ok(Visibility::Friends),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid visibility '{}', expected one of PUBLIC, PRIVATE, FRIENDS",
                s
            ))),
        }
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A stored media file and the metadata derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct MediaAsset {
    pub id: i64,
    pub trip_id: i64,
    pub user_id: i64,
    /// Absent until a place has been resolved
    pub place_id: Option<i64>,
    pub kind: MediaKind,
    pub storage_key: String,
    pub visibility: Visibility,
    pub uploaded_at: DateTime<Utc>,
    pub captured_at: DateTime<Utc>,
    pub gps_latitude: f64,
    pub gps_longitude: f64,
    pub gps_altitude: f64,
}

impl MediaAsset {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

/// Insert payload for a media asset. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMediaAsset {
    pub trip_id: i64,
    pub user_id: i64,
    pub place_id: Option<i64>,
    pub kind: MediaKind,
    pub storage_key: String,
    pub visibility: Visibility,
    pub uploaded_at: DateTime<Utc>,
    pub captured_at: DateTime<Utc>,
    pub gps_latitude: f64,
    pub gps_longitude: f64,
    pub gps_altitude: f64,
}

/// Coordinates and resolved place written by a metadata amendment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub place_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_parse_is_case_insensitive() {
        assert_eq!("public".parse::<Visibility>().unwrap(), Visibility::Public);
        assert_eq!(" Friends ".parse::<Visibility>().unwrap(), Visibility::Friends);
        assert_eq!("PRIVATE".parse::<Visibility>().unwrap(), Visibility::Private);
    }

    #[test]
    fn test_visibility_rejects_unknown_tier() {
        let err = "everyone".parse::<Visibility>().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_visibility_defaults_to_public_when_missing() {
        assert_eq!(Visibility::from_optional(None).unwrap(), Visibility::Public);
        assert_eq!(Visibility::from_optional(Some("  ")).unwrap(), Visibility::Public);
        assert_eq!(
            Visibility::from_optional(Some("private")).unwrap(),
            Visibility::Private
        );
    }

    #[test]
    fn test_serde_wire_names() {
        assert_eq!(
            serde_json::to_string(&Visibility::Friends).unwrap(),
            "\"FRIENDS\""
        );
        assert_eq!(serde_json::to_string(&MediaKind::Photo).unwrap(), "\"photo\"");
    }
}
