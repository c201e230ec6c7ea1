use chrono::{DateTime, Utc};
use poem_openapi::Object;

use crate::errors::AchievementError;
use crate::types::internal::achievement::{
    AcademicDetails, AchievementDetails, AchievementStats, AchievementType, AchievementView,
    Attachment, CertificationDetails, CompetitionDetails, EventInfo, OrganizationDetails, Period,
    PublicationDetails, TypedDetails,
};

/// Activity period of an organization role
#[derive(Object, Debug, Clone, PartialEq)]
pub struct PeriodDto {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Type-dependent achievement details
///
/// Only the fields belonging to the achievement's type may be set:
/// `score` for academic; `competitionName`, `competitionLevel`, `rank`,
/// `medalType` for competition; `organizationName`, `position`, `period` for
/// organization; `publicationType`, `publicationTitle`, `authors`,
/// `publisher`, `issn` for publication; `certificationName`, `issuedBy`,
/// `certificationNumber`, `validUntil` for certification. `eventDate`,
/// `location`, `organizer` and `customFields` are accepted for every type.
#[derive(Object, Debug, Clone, Default, PartialEq)]
#[oai(rename_all = "camelCase")]
pub struct AchievementDetailsDto {
    pub competition_name: Option<String>,
    /// international, national, regional or local
    pub competition_level: Option<String>,
    pub rank: Option<i32>,
    pub medal_type: Option<String>,

    /// journal, conference or book
    pub publication_type: Option<String>,
    pub publication_title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub publisher: Option<String>,
    pub issn: Option<String>,

    pub organization_name: Option<String>,
    pub position: Option<String>,
    pub period: Option<PeriodDto>,

    pub certification_name: Option<String>,
    pub issued_by: Option<String>,
    pub certification_number: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,

    pub score: Option<f64>,

    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub organizer: Option<String>,
    /// Free-form JSON object
    pub custom_fields: Option<serde_json::Value>,
}

impl AchievementDetailsDto {
    /// Wire names of the type-specific fields that are set
    fn present_specific_fields(&self) -> Vec<(&'static str, AchievementType)> {
        use AchievementType::*;

        let mut present = Vec::new();
        let mut mark = |set: bool, name: &'static str, owner: AchievementType| {
            if set {
                present.push((name, owner));
            }
        };
        mark(self.score.is_some(), "score", Academic);
        mark(self.competition_name.is_some(), "competitionName", Competition);
        mark(self.competition_level.is_some(), "competitionLevel", Competition);
        mark(self.rank.is_some(), "rank", Competition);
        mark(self.medal_type.is_some(), "medalType", Competition);
        mark(self.organization_name.is_some(), "organizationName", Organization);
        mark(self.position.is_some(), "position", Organization);
        mark(self.period.is_some(), "period", Organization);
        mark(self.publication_type.is_some(), "publicationType", Publication);
        mark(self.publication_title.is_some(), "publicationTitle", Publication);
        mark(self.authors.is_some(), "authors", Publication);
        mark(self.publisher.is_some(), "publisher", Publication);
        mark(self.issn.is_some(), "issn", Publication);
        mark(self.certification_name.is_some(), "certificationName", Certification);
        mark(self.issued_by.is_some(), "issuedBy", Certification);
        mark(self.certification_number.is_some(), "certificationNumber", Certification);
        mark(self.valid_until.is_some(), "validUntil", Certification);
        present
    }

    /// Convert the flat wire shape into the details of `kind`
    ///
    /// Fails with ValidationFailed if a field of another type is set or an
    /// enumerated value is unknown.
    pub fn into_details(self, kind: AchievementType) -> Result<AchievementDetails, AchievementError> {
        if let Some((field, owner)) = self
            .present_specific_fields()
            .into_iter()
            .find(|(_, owner)| *owner != kind)
        {
            return Err(AchievementError::validation(format!(
                "Field '{}' belongs to {} achievements and is not valid for {} achievements",
                field, owner, kind
            )));
        }

        let custom_fields = match self.custom_fields {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::Object(map)) => Some(map),
            Some(_) => {
                return Err(AchievementError::validation(
                    "Field 'customFields' must be a JSON object",
                ));
            }
        };

        let common = EventInfo {
            event_date: self.event_date,
            location: self.location,
            organizer: self.organizer,
            custom_fields,
        };

        let specific = match kind {
            AchievementType::Academic => TypedDetails::Academic(AcademicDetails { score: self.score }),
            AchievementType::Competition => TypedDetails::Competition(CompetitionDetails {
                competition_name: self.competition_name,
                competition_level: self
                    .competition_level
                    .as_deref()
                    .map(str::parse)
                    .transpose()?,
                rank: self.rank,
                medal_type: self.medal_type,
            }),
            AchievementType::Organization => {
                let period = match self.period {
                    Some(period) if period.end < period.start => {
                        return Err(AchievementError::validation(
                            "Field 'period' must not end before it starts",
                        ));
                    }
                    Some(period) => Some(Period {
                        start: period.start,
                        end: period.end,
                    }),
                    None => None,
                };
                TypedDetails::Organization(OrganizationDetails {
                    organization_name: self.organization_name,
                    position: self.position,
                    period,
                })
            }
            AchievementType::Publication => TypedDetails::Publication(PublicationDetails {
                publication_type: self
                    .publication_type
                    .as_deref()
                    .map(str::parse)
                    .transpose()?,
                publication_title: self.publication_title,
                authors: self.authors,
                publisher: self.publisher,
                issn: self.issn,
            }),
            AchievementType::Certification => TypedDetails::Certification(CertificationDetails {
                certification_name: self.certification_name,
                issued_by: self.issued_by,
                certification_number: self.certification_number,
                valid_until: self.valid_until,
            }),
            AchievementType::Other => TypedDetails::Other,
        };

        Ok(AchievementDetails { common, specific })
    }
}

impl From<&AchievementDetails> for AchievementDetailsDto {
    fn from(details: &AchievementDetails) -> Self {
        let mut dto = AchievementDetailsDto {
            event_date: details.common.event_date,
            location: details.common.location.clone(),
            organizer: details.common.organizer.clone(),
            custom_fields: details
                .common
                .custom_fields
                .clone()
                .map(serde_json::Value::Object),
            ..Default::default()
        };

        match &details.specific {
            TypedDetails::Academic(academic) => dto.score = academic.score,
            TypedDetails::Competition(competition) => {
                dto.competition_name = competition.competition_name.clone();
                dto.competition_level = competition.competition_level.map(|l| l.as_str().to_string());
                dto.rank = competition.rank;
                dto.medal_type = competition.medal_type.clone();
            }
            TypedDetails::Organization(organization) => {
                dto.organization_name = organization.organization_name.clone();
                dto.position = organization.position.clone();
                dto.period = organization.period.as_ref().map(|p| PeriodDto {
                    start: p.start,
                    end: p.end,
                });
            }
            TypedDetails::Publication(publication) => {
                dto.publication_type = publication.publication_type.map(|t| t.as_str().to_string());
                dto.publication_title = publication.publication_title.clone();
                dto.authors = publication.authors.clone();
                dto.publisher = publication.publisher.clone();
                dto.issn = publication.issn.clone();
            }
            TypedDetails::Certification(certification) => {
                dto.certification_name = certification.certification_name.clone();
                dto.issued_by = certification.issued_by.clone();
                dto.certification_number = certification.certification_number.clone();
                dto.valid_until = certification.valid_until;
            }
            TypedDetails::Other => {}
        }

        dto
    }
}

/// File attached to an achievement
#[derive(Object, Debug, Clone, PartialEq)]
#[oai(rename_all = "camelCase")]
pub struct AttachmentDto {
    pub file_name: String,
    pub file_url: String,
    /// MIME type
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<AttachmentDto> for Attachment {
    fn from(dto: AttachmentDto) -> Self {
        Attachment {
            file_name: dto.file_name,
            file_url: dto.file_url,
            file_type: dto.file_type,
            uploaded_at: dto.uploaded_at,
        }
    }
}

impl From<&Attachment> for AttachmentDto {
    fn from(attachment: &Attachment) -> Self {
        AttachmentDto {
            file_name: attachment.file_name.clone(),
            file_url: attachment.file_url.clone(),
            file_type: attachment.file_type.clone(),
            uploaded_at: attachment.uploaded_at,
        }
    }
}

/// Request model for creating a draft achievement
#[derive(Object, Debug, Clone, Default)]
#[oai(rename_all = "camelCase")]
pub struct CreateAchievementRequest {
    /// academic, competition, organization, publication, certification or other
    #[oai(default)]
    pub achievement_type: String,

    #[oai(default)]
    pub title: String,

    #[oai(default)]
    pub description: String,

    pub details: Option<AchievementDetailsDto>,

    pub attachments: Option<Vec<AttachmentDto>>,

    pub tags: Option<Vec<String>>,

    pub points: Option<i32>,
}

/// Request model for a partial update of a draft achievement
///
/// Omitted fields keep their current value.
#[derive(Object, Debug, Clone, Default)]
#[oai(rename_all = "camelCase")]
pub struct UpdateAchievementRequest {
    pub achievement_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Replaces the stored details as a whole
    pub details: Option<AchievementDetailsDto>,
    pub attachments: Option<Vec<AttachmentDto>>,
    pub tags: Option<Vec<String>>,
    pub points: Option<i32>,
}

/// Request model for rejecting a submitted achievement
#[derive(Object, Debug, Clone)]
#[oai(rename_all = "camelCase")]
pub struct RejectAchievementRequest {
    /// Reason shown to the student
    #[oai(default)]
    pub rejection_note: String,
}

/// Achievement content merged with its lifecycle state
#[derive(Object, Debug, Clone)]
#[oai(rename_all = "camelCase")]
pub struct AchievementResponse {
    /// Content id (24 hex characters)
    pub id: String,
    pub student_id: String,
    pub achievement_type: String,
    pub title: String,
    pub description: String,
    pub details: AchievementDetailsDto,
    pub attachments: Vec<AttachmentDto>,
    pub tags: Vec<String>,
    pub points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// draft, submitted, verified, rejected
    pub status: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    /// User id of the verifier or rejecter
    pub verified_by: Option<String>,
    pub rejection_note: Option<String>,
}

fn timestamp(value: Option<i64>) -> Option<DateTime<Utc>> {
    value.and_then(|secs| DateTime::from_timestamp(secs, 0))
}

impl From<AchievementView> for AchievementResponse {
    fn from(view: AchievementView) -> Self {
        let AchievementView { content, reference } = view;
        AchievementResponse {
            details: AchievementDetailsDto::from(&content.details),
            attachments: content.attachments.iter().map(AttachmentDto::from).collect(),
            id: content.id,
            student_id: content.student_id,
            achievement_type: content.achievement_type.to_string(),
            title: content.title,
            description: content.description,
            tags: content.tags,
            points: content.points,
            created_at: content.created_at,
            updated_at: content.updated_at,
            status: reference.status.to_string(),
            submitted_at: timestamp(reference.submitted_at),
            verified_at: timestamp(reference.verified_at),
            verified_by: reference.verified_by,
            rejection_note: reference.rejection_note,
        }
    }
}

/// Workflow-wide verification statistics
#[derive(Object, Debug, Clone)]
pub struct StatsResponse {
    /// Achievements that are not deleted
    pub total: u64,
    pub verified: u64,
    /// Floor of verified / total * 100
    pub percentage: u64,
}

impl From<AchievementStats> for StatsResponse {
    fn from(stats: AchievementStats) -> Self {
        StatsResponse {
            total: stats.total,
            verified: stats.verified,
            percentage: stats.percentage,
        }
    }
}

/// Success envelope around a single achievement
#[derive(Object, Debug)]
pub struct AchievementEnvelope {
    /// Always `success`
    pub status: String,
    pub data: AchievementResponse,
}

/// Success envelope around a list of achievements
#[derive(Object, Debug)]
pub struct AchievementListEnvelope {
    pub status: String,
    pub data: Vec<AchievementResponse>,
}

#[derive(Object, Debug)]
pub struct StatsEnvelope {
    pub status: String,
    pub data: StatsResponse,
}

#[derive(Object, Debug)]
pub struct AttachmentEnvelope {
    pub status: String,
    pub data: AttachmentDto,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::internal::achievement::{CompetitionLevel, PublicationType};

    #[test]
    fn test_competition_details_convert() {
        let dto = AchievementDetailsDto {
            competition_name: Some("Gemastik".to_string()),
            competition_level: Some("national".to_string()),
            rank: Some(2),
            location: Some("Surabaya".to_string()),
            ..Default::default()
        };

        let details = dto.clone().into_details(AchievementType::Competition).unwrap();
        match &details.specific {
            TypedDetails::Competition(c) => {
                assert_eq!(c.competition_level, Some(CompetitionLevel::National));
                assert_eq!(c.rank, Some(2));
            }
            other => panic!("unexpected details: {other:?}"),
        }
        assert_eq!(details.common.location.as_deref(), Some("Surabaya"));
        assert_eq!(AchievementDetailsDto::from(&details), dto);
    }

    #[test]
    fn test_foreign_field_is_rejected() {
        let dto = AchievementDetailsDto {
            publisher: Some("IEEE".to_string()),
            ..Default::default()
        };

        let err = dto.into_details(AchievementType::Academic).unwrap_err();
        assert!(matches!(err, AchievementError::ValidationFailed(_)));
        assert!(err.message().contains("publisher"));
    }

    #[test]
    fn test_unknown_enum_value_is_rejected() {
        let dto = AchievementDetailsDto {
            publication_type: Some("blog".to_string()),
            ..Default::default()
        };
        assert!(dto.into_details(AchievementType::Publication).is_err());

        let dto = AchievementDetailsDto {
            publication_type: Some("journal".to_string()),
            authors: Some(vec!["A".to_string(), "B".to_string()]),
            ..Default::default()
        };
        let details = dto.into_details(AchievementType::Publication).unwrap();
        match details.specific {
            TypedDetails::Publication(p) => {
                assert_eq!(p.publication_type, Some(PublicationType::Journal));
                assert_eq!(p.authors.unwrap().len(), 2);
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn test_custom_fields_must_be_object() {
        let dto = AchievementDetailsDto {
            custom_fields: Some(serde_json::json!([1, 2, 3])),
            ..Default::default()
        };
        assert!(dto.into_details(AchievementType::Other).is_err());

        let dto = AchievementDetailsDto {
            custom_fields: Some(serde_json::json!({"mentor": "Dr. Budi"})),
            ..Default::default()
        };
        let details = dto.into_details(AchievementType::Other).unwrap();
        assert_eq!(details.specific, TypedDetails::Other);
        assert!(details.common.custom_fields.unwrap().contains_key("mentor"));
    }
}
