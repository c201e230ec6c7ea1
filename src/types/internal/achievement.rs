use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AchievementError;
use crate::types::db::{AchievementStatus, achievement_reference};

/// Kind of achievement; selects which detail fields are meaningful
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementType {
    Academic,
    Competition,
    Organization,
    Publication,
    Certification,
    Other,
}

impl AchievementType {
    pub const ALL: [AchievementType; 6] = [
        AchievementType::Academic,
        AchievementType::Competition,
        AchievementType::Organization,
        AchievementType::Publication,
        AchievementType::Certification,
        AchievementType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementType::Academic => "academic",
            AchievementType::Competition => "competition",
            AchievementType::Organization => "organization",
            AchievementType::Publication => "publication",
            AchievementType::Certification => "certification",
            AchievementType::Other => "other",
        }
    }
}

impl fmt::Display for AchievementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementType {
    type Err = AchievementError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AchievementType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| {
                AchievementError::validation(format!(
                    "Invalid achievement type '{}'; expected one of academic, competition, organization, publication, certification, other",
                    value
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionLevel {
    International,
    National,
    Regional,
    Local,
}

impl FromStr for CompetitionLevel {
    type Err = AchievementError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "international" => Ok(Self::International),
            "national" => Ok(Self::National),
            "regional" => Ok(Self::Regional),
            "local" => Ok(Self::Local),
            other => Err(AchievementError::validation(format!(
                "Invalid competition level '{}'",
                other
            ))),
        }
    }
}

impl CompetitionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::International => "international",
            Self::National => "national",
            Self::Regional => "regional",
            Self::Local => "local",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationType {
    Journal,
    Conference,
    Book,
}

impl FromStr for PublicationType {
    type Err = AchievementError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "journal" => Ok(Self::Journal),
            "conference" => Ok(Self::Conference),
            "book" => Ok(Self::Book),
            other => Err(AchievementError::validation(format!(
                "Invalid publication type '{}'",
                other
            ))),
        }
    }
}

impl PublicationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::Conference => "conference",
            Self::Book => "book",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Event metadata shared by every achievement type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub organizer: Option<String>,
    pub custom_fields: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcademicDetails {
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionDetails {
    pub competition_name: Option<String>,
    pub competition_level: Option<CompetitionLevel>,
    pub rank: Option<i32>,
    pub medal_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDetails {
    pub organization_name: Option<String>,
    pub position: Option<String>,
    pub period: Option<Period>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationDetails {
    pub publication_type: Option<PublicationType>,
    pub publication_title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub publisher: Option<String>,
    pub issn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationDetails {
    pub certification_name: Option<String>,
    pub issued_by: Option<String>,
    pub certification_number: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
}

/// Type-specific detail fields, keyed by achievement type
///
/// A record can only carry the fields of its own type; publication fields on
/// an academic record are unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypedDetails {
    Academic(AcademicDetails),
    Competition(CompetitionDetails),
    Organization(OrganizationDetails),
    Publication(PublicationDetails),
    Certification(CertificationDetails),
    Other,
}

impl TypedDetails {
    /// Empty details for a type
    pub fn empty(kind: AchievementType) -> Self {
        match kind {
            AchievementType::Academic => TypedDetails::Academic(AcademicDetails::default()),
            AchievementType::Competition => TypedDetails::Competition(CompetitionDetails::default()),
            AchievementType::Organization => {
                TypedDetails::Organization(OrganizationDetails::default())
            }
            AchievementType::Publication => TypedDetails::Publication(PublicationDetails::default()),
            AchievementType::Certification => {
                TypedDetails::Certification(CertificationDetails::default())
            }
            AchievementType::Other => TypedDetails::Other,
        }
    }

    pub fn kind(&self) -> AchievementType {
        match self {
            TypedDetails::Academic(_) => AchievementType::Academic,
            TypedDetails::Competition(_) => AchievementType::Competition,
            TypedDetails::Organization(_) => AchievementType::Organization,
            TypedDetails::Publication(_) => AchievementType::Publication,
            TypedDetails::Certification(_) => AchievementType::Certification,
            TypedDetails::Other => AchievementType::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDetails {
    pub common: EventInfo,
    pub specific: TypedDetails,
}

impl AchievementDetails {
    pub fn empty(kind: AchievementType) -> Self {
        Self {
            common: EventInfo::default(),
            specific: TypedDetails::empty(kind),
        }
    }
}

/// Uploaded file descriptor embedded in the content document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub file_url: String,
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Full achievement payload as held by the content store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementContent {
    pub id: String,
    /// `students.id` of the author; not enforced by the content store
    pub student_id: String,
    pub achievement_type: AchievementType,
    pub title: String,
    pub description: String,
    pub details: AchievementDetails,
    pub attachments: Vec<Attachment>,
    pub tags: Vec<String>,
    pub points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content joined with the lifecycle state of its reference
#[derive(Debug, Clone, PartialEq)]
pub struct AchievementView {
    pub content: AchievementContent,
    pub reference: achievement_reference::Model,
}

impl AchievementView {
    pub fn status(&self) -> AchievementStatus {
        self.reference.status
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementStats {
    pub total: u64,
    pub verified: u64,
    /// Floor of verified / total * 100, 0 when there are no achievements
    pub percentage: u64,
}

impl AchievementStats {
    pub fn from_counts(total: u64, verified: u64) -> Self {
        let percentage = if total == 0 { 0 } else { verified * 100 / total };
        Self {
            total,
            verified,
            percentage,
        }
    }
}

/// Outcome of an orphan sweep over the content store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanReport {
    pub scanned: usize,
    pub orphans: Vec<String>,
    pub purged: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_achievement_type_parses_every_variant() {
        for kind in AchievementType::ALL {
            assert_eq!(kind.as_str().parse::<AchievementType>().unwrap(), kind);
        }
    }

    #[test]
    fn test_achievement_type_rejects_unknown() {
        let err = "sports".parse::<AchievementType>().unwrap_err();
        assert!(matches!(err, AchievementError::ValidationFailed(_)));
        assert!(err.message().contains("sports"));
    }

    #[test]
    fn test_stats_percentage_is_floored() {
        assert_eq!(AchievementStats::from_counts(4, 1).percentage, 25);
        assert_eq!(AchievementStats::from_counts(3, 2).percentage, 66);
        assert_eq!(AchievementStats::from_counts(0, 0).percentage, 0);
    }

    #[test]
    fn test_details_document_roundtrip_keeps_variant() {
        let details = AchievementDetails {
            common: EventInfo {
                location: Some("Jakarta".to_string()),
                ..Default::default()
            },
            specific: TypedDetails::Competition(CompetitionDetails {
                competition_name: Some("ICPC".to_string()),
                competition_level: Some(CompetitionLevel::International),
                rank: Some(1),
                medal_type: Some("gold".to_string()),
            }),
        };

        let json = serde_json::to_string(&details).unwrap();
        assert!(json.contains("\"kind\":\"competition\""));
        let back: AchievementDetails = serde_json::from_str(&json).unwrap();
        assert_eq!(back, details);
        assert_eq!(back.specific.kind(), AchievementType::Competition);
    }
}
