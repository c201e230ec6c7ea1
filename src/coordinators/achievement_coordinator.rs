use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::app_data::AppData;
use crate::errors::{AchievementError, InternalError};
use crate::providers::ProfileProvider;
use crate::providers::file_storage::{self, FileStorage};
use crate::stores::content_store::{is_content_id, new_content_id};
use crate::stores::reference_store::TransitionStamp;
use crate::stores::{ContentStore, ReferenceStore};
use crate::types::db::{AchievementStatus, achievement_reference, student};
use crate::types::dto::achievement::{
    AchievementDetailsDto, CreateAchievementRequest, UpdateAchievementRequest,
};
use crate::types::internal::achievement::{
    AchievementContent, AchievementDetails, AchievementStats, AchievementType, AchievementView,
    Attachment, OrphanReport,
};
use crate::types::internal::{Principal, RequestContext, RoleKind};

/// Single entry point of the achievement workflow
///
/// Binds the reference ledger (lifecycle, ownership) to the content store
/// (payload). The two live in separate databases, so every operation that
/// touches both orders its writes so a failure leaves at worst an orphaned
/// content document, which `sweep_orphans` finds.
pub struct AchievementCoordinator {
    ledger: DatabaseConnection,
    content: DatabaseConnection,
    reference_store: Arc<ReferenceStore>,
    content_store: Arc<ContentStore>,
    profile_provider: Arc<ProfileProvider>,
    file_storage: Arc<dyn FileStorage>,
}

impl AchievementCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        let profile_provider = Arc::new(ProfileProvider::new(
            app_data.identity_store.clone(),
            app_data.profile_store.clone(),
        ));

        Self {
            ledger: app_data.connections.ledger.clone(),
            content: app_data.connections.content.clone(),
            reference_store: app_data.reference_store.clone(),
            content_store: app_data.content_store.clone(),
            profile_provider,
            file_storage: app_data.file_storage.clone(),
        }
    }

    /// Create a draft achievement for the calling student
    ///
    /// Content is written first, then the `draft` reference. If the reference
    /// cannot be written the content is deleted again.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: CreateAchievementRequest,
    ) -> Result<AchievementView, InternalError> {
        let (_principal, student) = self.require_student(ctx, "create").await?;

        let kind = parse_type(&request.achievement_type)?;
        let title = required_text("title", &request.title)?;
        let description = required_text("description", &request.description)?;
        let details = match request.details {
            Some(dto) => dto.into_details(kind)?,
            None => AchievementDetails::empty(kind),
        };

        let now = Utc::now();
        let content = AchievementContent {
            id: new_content_id(),
            student_id: student.id.clone(),
            achievement_type: kind,
            title,
            description,
            details,
            attachments: request
                .attachments
                .unwrap_or_default()
                .into_iter()
                .map(Attachment::from)
                .collect(),
            tags: request.tags.unwrap_or_default(),
            points: request.points.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };

        self.content_store.insert(&self.content, &content).await?;

        let reference = match self
            .reference_store
            .create_draft(&self.ledger, &student.id, &content.id)
            .await
        {
            Ok(reference) => reference,
            Err(err) => {
                self.compensate_create(&content.id).await;
                return Err(err);
            }
        };

        tracing::info!(
            content_id = %content.id,
            student_id = %student.id,
            request_id = %ctx.request_id,
            "Achievement created as draft"
        );

        Ok(AchievementView { content, reference })
    }

    async fn compensate_create(&self, content_id: &str) {
        match self.content_store.delete(&self.content, content_id).await {
            Ok(_) => {
                tracing::warn!(
                    content_id = %content_id,
                    "Reference write failed; removed the content document again"
                );
            }
            Err(cleanup_err) => {
                tracing::warn!(
                    content_id = %content_id,
                    error = %cleanup_err,
                    "Reference write failed and the content document could not be removed; it is now orphaned"
                );
            }
        }
    }

    /// Move an owned draft to `submitted`
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        content_id: &str,
    ) -> Result<AchievementView, InternalError> {
        let (_student, _reference) = self.owned_draft(ctx, content_id, DraftAction::Submit).await?;

        let moved = self
            .reference_store
            .transition(
                &self.ledger,
                content_id,
                AchievementStatus::Draft,
                AchievementStatus::Submitted,
                TransitionStamp {
                    submitted_at: Some(Utc::now().timestamp()),
                    ..Default::default()
                },
            )
            .await?;
        if !moved {
            return Err(AchievementError::not_in_status("submitted", "draft").into());
        }

        tracing::info!(content_id = %content_id, request_id = %ctx.request_id, "Achievement submitted");

        self.load_view(content_id).await
    }

    /// Apply a partial update to an owned draft
    ///
    /// Omitted fields keep their value; `updatedAt` is always refreshed. Changing
    /// the type without sending details re-checks the stored details against the
    /// new type.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        content_id: &str,
        request: UpdateAchievementRequest,
    ) -> Result<AchievementView, InternalError> {
        let (_student, _reference) = self.owned_draft(ctx, content_id, DraftAction::Update).await?;
        let previous = self.require_content(content_id).await?;
        let mut content = previous.clone();

        let previous_kind = content.achievement_type;
        if let Some(kind) = &request.achievement_type {
            content.achievement_type = parse_type(kind)?;
        }
        if let Some(title) = &request.title {
            content.title = required_text("title", title)?;
        }
        if let Some(description) = &request.description {
            content.description = required_text("description", description)?;
        }
        match request.details {
            Some(dto) => content.details = dto.into_details(content.achievement_type)?,
            None if content.achievement_type != previous_kind => {
                content.details =
                    AchievementDetailsDto::from(&content.details).into_details(content.achievement_type)?;
            }
            None => {}
        }
        if let Some(attachments) = request.attachments {
            content.attachments = attachments.into_iter().map(Attachment::from).collect();
        }
        if let Some(tags) = request.tags {
            content.tags = tags;
        }
        if let Some(points) = request.points {
            content.points = points;
        }
        content.updated_at = Utc::now();

        // Draft guard in the ledger before the content write
        if !self.reference_store.touch_draft(&self.ledger, content_id).await? {
            return Err(AchievementError::not_in_status("updated", "draft").into());
        }
        self.content_store.replace(&self.content, &content).await?;
        let reference = self.settle_update(content_id, &previous).await?;

        tracing::info!(content_id = %content_id, request_id = %ctx.request_id, "Achievement updated");

        Ok(AchievementView { content, reference })
    }

    /// Confirm the reference is still a draft after an update's content write
    ///
    /// A submit committing between the draft guard and the write would leave an
    /// edit on submitted content; in that case the previous document is put back
    /// and the update reports a Conflict.
    async fn settle_update(
        &self,
        content_id: &str,
        previous: &AchievementContent,
    ) -> Result<achievement_reference::Model, InternalError> {
        let reference = self.require_reference(content_id).await?;
        if reference.status == AchievementStatus::Draft {
            return Ok(reference);
        }

        tracing::warn!(
            content_id = %content_id,
            status = %reference.status.as_str(),
            "Reference left draft during update, restoring previous content"
        );
        if let Err(e) = self.content_store.replace(&self.content, previous).await {
            tracing::warn!(content_id = %content_id, "Failed to restore content after lost update race: {}", e);
        }
        Err(AchievementError::not_in_status("updated", "draft").into())
    }

    /// Soft-delete an owned draft
    ///
    /// The reference moves to the terminal `deleted` state and stays in the
    /// ledger; the content document is removed. If removal fails the reference
    /// is put back to `draft`.
    pub async fn delete(&self, ctx: &RequestContext, content_id: &str) -> Result<(), InternalError> {
        let (_student, _reference) = self.owned_draft(ctx, content_id, DraftAction::Delete).await?;

        let moved = self
            .reference_store
            .transition(
                &self.ledger,
                content_id,
                AchievementStatus::Draft,
                AchievementStatus::Deleted,
                TransitionStamp::default(),
            )
            .await?;
        if !moved {
            return Err(AchievementError::not_in_status("deleted", "draft").into());
        }

        if let Err(err) = self.content_store.delete(&self.content, content_id).await {
            let reverted = self
                .reference_store
                .transition(
                    &self.ledger,
                    content_id,
                    AchievementStatus::Deleted,
                    AchievementStatus::Draft,
                    TransitionStamp::default(),
                )
                .await;
            tracing::warn!(
                content_id = %content_id,
                error = %err,
                reverted = matches!(reverted, Ok(true)),
                "Content removal failed after soft delete; reverting reference to draft"
            );
            return Err(err);
        }

        tracing::info!(content_id = %content_id, request_id = %ctx.request_id, "Achievement deleted");
        Ok(())
    }

    /// Achievements visible to the caller, newest first
    ///
    /// Students see their own, advisors those of their advisees, admins all.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<AchievementView>, InternalError> {
        let principal = self.principal(ctx).await?;

        let references = match principal.kind {
            RoleKind::Student => {
                let student = self.profile_provider.student_for(&self.ledger, &principal).await?;
                self.reference_store.list_for_student(&self.ledger, &student.id).await?
            }
            RoleKind::Advisor => {
                let lecturer = self.profile_provider.lecturer_for(&self.ledger, &principal).await?;
                self.reference_store.list_for_advisor(&self.ledger, &lecturer.id).await?
            }
            RoleKind::Admin => self.reference_store.list_all(&self.ledger).await?,
            RoleKind::Other => {
                return Err(AchievementError::forbidden("Role is not allowed to view achievements").into());
            }
        };

        if references.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = references.iter().map(|r| r.content_id.clone()).collect();
        let mut contents: HashMap<String, AchievementContent> = self
            .content_store
            .find_by_ids(&self.content, &ids)
            .await?
            .into_iter()
            .map(|content| (content.id.clone(), content))
            .collect();

        let views = references
            .into_iter()
            .filter_map(|reference| match contents.remove(&reference.content_id) {
                Some(content) => Some(AchievementView { content, reference }),
                None => {
                    tracing::warn!(
                        content_id = %reference.content_id,
                        "Reference has no content document; skipping"
                    );
                    None
                }
            })
            .collect();

        Ok(views)
    }

    /// A single achievement, if the caller may see it
    ///
    /// Deleted achievements are NotFound.
    pub async fn get_by_id(
        &self,
        ctx: &RequestContext,
        content_id: &str,
    ) -> Result<AchievementView, InternalError> {
        let principal = self.principal(ctx).await?;
        let reference = self.require_reference(content_id).await?;

        match principal.kind {
            RoleKind::Student => {
                let student = self.profile_provider.student_for(&self.ledger, &principal).await?;
                if reference.student_id != student.id {
                    return Err(AchievementError::forbidden("You can only view your own achievements").into());
                }
            }
            RoleKind::Advisor => {
                if !self.advises(&principal, &reference).await? {
                    return Err(AchievementError::forbidden(
                        "You can only view achievements of your advisees",
                    )
                    .into());
                }
            }
            RoleKind::Admin => {}
            RoleKind::Other => {
                return Err(AchievementError::forbidden("Role is not allowed to view achievements").into());
            }
        }

        let content = self.require_content(content_id).await?;
        Ok(AchievementView { content, reference })
    }

    /// Mark a submitted achievement as verified
    pub async fn verify(
        &self,
        ctx: &RequestContext,
        content_id: &str,
    ) -> Result<AchievementView, InternalError> {
        let principal = self.reviewer(ctx, content_id, "verified").await?;

        let moved = self
            .reference_store
            .transition(
                &self.ledger,
                content_id,
                AchievementStatus::Submitted,
                AchievementStatus::Verified,
                TransitionStamp {
                    verified_at: Some(Utc::now().timestamp()),
                    verified_by: Some(principal.user_id.clone()),
                    ..Default::default()
                },
            )
            .await?;
        if !moved {
            return Err(AchievementError::not_in_status("verified", "submitted").into());
        }

        tracing::info!(
            content_id = %content_id,
            verified_by = %principal.user_id,
            request_id = %ctx.request_id,
            "Achievement verified"
        );

        self.load_view(content_id).await
    }

    /// Reject a submitted achievement with a note for the student
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        content_id: &str,
        rejection_note: &str,
    ) -> Result<AchievementView, InternalError> {
        let note = required_text("rejectionNote", rejection_note)?;
        let principal = self.reviewer(ctx, content_id, "rejected").await?;

        let moved = self
            .reference_store
            .transition(
                &self.ledger,
                content_id,
                AchievementStatus::Submitted,
                AchievementStatus::Rejected,
                TransitionStamp {
                    verified_by: Some(principal.user_id.clone()),
                    rejection_note: Some(note),
                    ..Default::default()
                },
            )
            .await?;
        if !moved {
            return Err(AchievementError::not_in_status("rejected", "submitted").into());
        }

        tracing::info!(
            content_id = %content_id,
            rejected_by = %principal.user_id,
            request_id = %ctx.request_id,
            "Achievement rejected"
        );

        self.load_view(content_id).await
    }

    /// Verification statistics over all non-deleted achievements
    pub async fn stats(&self) -> Result<AchievementStats, InternalError> {
        let total = self.reference_store.count_active(&self.ledger).await?;
        let verified = self
            .reference_store
            .count_with_status(&self.ledger, AchievementStatus::Verified)
            .await?;

        Ok(AchievementStats::from_counts(total, verified))
    }

    /// Validate and store an uploaded file, returning its attachment descriptor
    pub async fn attach_file(
        &self,
        ctx: &RequestContext,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Attachment, InternalError> {
        let principal = self.principal(ctx).await?;
        let attachment = file_storage::store_attachment(self.file_storage.as_ref(), file_name, bytes).await?;

        tracing::info!(
            user_id = %principal.user_id,
            file = %attachment.file_name,
            request_id = %ctx.request_id,
            "Attachment uploaded"
        );

        Ok(attachment)
    }

    /// Find content documents without a live reference
    ///
    /// Each orphan is logged; with `purge` they are also deleted.
    pub async fn sweep_orphans(&self, purge: bool) -> Result<OrphanReport, InternalError> {
        let live: HashSet<String> = self
            .reference_store
            .active_content_ids(&self.ledger)
            .await?
            .into_iter()
            .collect();
        let content_ids = self.content_store.list_ids(&self.content).await?;

        let mut report = OrphanReport {
            scanned: content_ids.len(),
            ..Default::default()
        };

        for id in content_ids.into_iter().filter(|id| !live.contains(id)) {
            tracing::warn!(content_id = %id, "Content document has no live reference");
            if purge && self.content_store.delete(&self.content, &id).await? {
                report.purged += 1;
            }
            report.orphans.push(id);
        }

        tracing::info!(
            scanned = report.scanned,
            orphans = report.orphans.len(),
            purged = report.purged,
            "Orphan sweep finished"
        );

        Ok(report)
    }

    async fn principal(&self, ctx: &RequestContext) -> Result<Principal, InternalError> {
        let claims = ctx.require_claims()?;
        self.profile_provider.resolve_principal(&self.ledger, claims).await
    }

    async fn require_student(
        &self,
        ctx: &RequestContext,
        action: &str,
    ) -> Result<(Principal, student::Model), InternalError> {
        let principal = self.principal(ctx).await?;
        if principal.kind != RoleKind::Student {
            return Err(AchievementError::forbidden(format!("Only students can {} achievements", action)).into());
        }
        let student = self.profile_provider.student_for(&self.ledger, &principal).await?;
        Ok((principal, student))
    }

    /// Gate shared by submit, update and delete: student role, existing
    /// reference, `draft` status, then ownership
    async fn owned_draft(
        &self,
        ctx: &RequestContext,
        content_id: &str,
        action: DraftAction,
    ) -> Result<(student::Model, achievement_reference::Model), InternalError> {
        let (_principal, student) = self.require_student(ctx, action.verb()).await?;
        let reference = self.require_reference(content_id).await?;

        if reference.status != AchievementStatus::Draft {
            return Err(AchievementError::not_in_status(action.past(), "draft").into());
        }
        if reference.student_id != student.id {
            return Err(AchievementError::forbidden(format!(
                "You can only {} your own achievements",
                action.verb()
            ))
            .into());
        }

        Ok((student, reference))
    }

    /// Gate shared by verify and reject: advisor of the owner or admin, and the
    /// reference must be `submitted`
    async fn reviewer(
        &self,
        ctx: &RequestContext,
        content_id: &str,
        action: &str,
    ) -> Result<Principal, InternalError> {
        let principal = self.principal(ctx).await?;
        if !matches!(principal.kind, RoleKind::Advisor | RoleKind::Admin) {
            return Err(AchievementError::forbidden("Only advisors and admins can review achievements").into());
        }

        let reference = self.require_reference(content_id).await?;
        if reference.status != AchievementStatus::Submitted {
            return Err(AchievementError::not_in_status(action, "submitted").into());
        }
        if principal.kind == RoleKind::Advisor && !self.advises(&principal, &reference).await? {
            return Err(AchievementError::forbidden(
                "You can only review achievements of your advisees",
            )
            .into());
        }

        Ok(principal)
    }

    /// Whether the advisor is assigned to the student owning the reference
    async fn advises(
        &self,
        principal: &Principal,
        reference: &achievement_reference::Model,
    ) -> Result<bool, InternalError> {
        let lecturer = self.profile_provider.lecturer_for(&self.ledger, principal).await?;
        let owner = self
            .profile_provider
            .student_by_id(&self.ledger, &reference.student_id)
            .await?;

        Ok(owner.and_then(|s| s.advisor_id).as_deref() == Some(lecturer.id.as_str()))
    }

    async fn require_reference(
        &self,
        content_id: &str,
    ) -> Result<achievement_reference::Model, InternalError> {
        if !is_content_id(content_id) {
            return Err(AchievementError::not_found().into());
        }
        self.reference_store
            .find_by_content_id(&self.ledger, content_id)
            .await?
            .ok_or_else(|| AchievementError::not_found().into())
    }

    async fn require_content(&self, content_id: &str) -> Result<AchievementContent, InternalError> {
        match self.content_store.find_by_id(&self.content, content_id).await? {
            Some(content) => Ok(content),
            None => {
                tracing::warn!(content_id = %content_id, "Live reference has no content document");
                Err(AchievementError::not_found().into())
            }
        }
    }

    async fn load_view(&self, content_id: &str) -> Result<AchievementView, InternalError> {
        let reference = self.require_reference(content_id).await?;
        let content = self.require_content(content_id).await?;
        Ok(AchievementView { content, reference })
    }
}

/// Student actions allowed only on a `draft`
#[derive(Debug, Clone, Copy)]
enum DraftAction {
    Submit,
    Update,
    Delete,
}

impl DraftAction {
    fn verb(self) -> &'static str {
        match self {
            DraftAction::Submit => "submit",
            DraftAction::Update => "update",
            DraftAction::Delete => "delete",
        }
    }

    fn past(self) -> &'static str {
        match self {
            DraftAction::Submit => "submitted",
            DraftAction::Update => "updated",
            DraftAction::Delete => "deleted",
        }
    }
}

fn parse_type(value: &str) -> Result<AchievementType, AchievementError> {
    if value.trim().is_empty() {
        return Err(AchievementError::validation("Field 'achievementType' is required"));
    }
    value.trim().parse()
}

fn required_text(field: &str, value: &str) -> Result<String, AchievementError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AchievementError::validation(format!("Field '{}' is required", field)));
    }
    Ok(trimmed.to_string())
}
