use std::sync::Arc;

use poem::Request;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::types::multipart::Upload;
use poem_openapi::{ApiResponse, Multipart, OpenApi};
use sea_orm::DatabaseConnection;

use crate::api::ApiTags;
use crate::app_data::AppData;
use crate::coordinators::AchievementCoordinator;
use crate::errors::AchievementApiError;
use crate::providers::file_storage::MAX_UPLOAD_BYTES;
use crate::providers::permission_provider::{
    PERM_ACHIEVEMENT_CREATE, PERM_ACHIEVEMENT_DELETE, PERM_ACHIEVEMENT_READ, PERM_ACHIEVEMENT_UPDATE,
    PERM_ACHIEVEMENT_VERIFY,
};
use crate::providers::{PermissionProvider, TokenProvider};
use crate::types::dto::achievement::{
    AchievementEnvelope, AchievementListEnvelope, AchievementResponse, AttachmentDto, AttachmentEnvelope,
    CreateAchievementRequest, RejectAchievementRequest, StatsEnvelope, UpdateAchievementRequest,
};
use crate::types::dto::common::{MessageEnvelope, STATUS_SUCCESS};
use crate::types::internal::RequestContext;
use crate::types::internal::achievement::AchievementView;

/// Achievement workflow endpoints
pub struct AchievementApi {
    coordinator: AchievementCoordinator,
    permission_provider: PermissionProvider,
    token_provider: Arc<TokenProvider>,
    ledger: DatabaseConnection,
}

impl AchievementApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            permission_provider: PermissionProvider::new(app_data.identity_store.clone()),
            token_provider: app_data.token_provider.clone(),
            ledger: app_data.connections.ledger.clone(),
            coordinator: AchievementCoordinator::new(app_data),
        }
    }

    /// Build the request context and enforce the route permission
    async fn authorize(&self, req: &Request, permission: &str) -> Result<RequestContext, AchievementApiError> {
        let ctx = RequestContext::validate_request(req, &self.token_provider);
        self.permission_provider
            .require(&self.ledger, &ctx, permission)
            .await
            .map_err(AchievementApiError::from_internal_error)?;
        Ok(ctx)
    }
}

/// Multipart body of the upload route
#[derive(Debug, Multipart)]
pub struct UploadForm {
    file: Upload,
}

#[derive(ApiResponse)]
pub enum CreateAchievementResponse {
    /// Draft created
    #[oai(status = 201)]
    Created(Json<AchievementEnvelope>),
}

fn envelope(view: AchievementView) -> Json<AchievementEnvelope> {
    Json(AchievementEnvelope {
        status: STATUS_SUCCESS.to_string(),
        data: AchievementResponse::from(view),
    })
}

#[OpenApi(prefix_path = "/v1/achievements")]
impl AchievementApi {
    /// Verification statistics
    ///
    /// Public. Counts every achievement that is not deleted.
    #[oai(path = "/stats", method = "get", tag = "ApiTags::Achievements")]
    async fn stats(&self) -> Result<Json<StatsEnvelope>, AchievementApiError> {
        let stats = self
            .coordinator
            .stats()
            .await
            .map_err(AchievementApiError::from_internal_error)?;

        Ok(Json(StatsEnvelope {
            status: STATUS_SUCCESS.to_string(),
            data: stats.into(),
        }))
    }

    /// List achievements visible to the caller
    ///
    /// Students see their own, advisors those of their advisees, admins every achievement.
    #[oai(path = "/", method = "get", tag = "ApiTags::Achievements")]
    async fn list(&self, req: &Request) -> Result<Json<AchievementListEnvelope>, AchievementApiError> {
        let ctx = self.authorize(req, PERM_ACHIEVEMENT_READ).await?;
        let views = self
            .coordinator
            .list(&ctx)
            .await
            .map_err(AchievementApiError::from_internal_error)?;

        Ok(Json(AchievementListEnvelope {
            status: STATUS_SUCCESS.to_string(),
            data: views.into_iter().map(AchievementResponse::from).collect(),
        }))
    }

    /// Create a draft achievement
    #[oai(path = "/", method = "post", tag = "ApiTags::Achievements")]
    async fn create(
        &self,
        req: &Request,
        body: Json<CreateAchievementRequest>,
    ) -> Result<CreateAchievementResponse, AchievementApiError> {
        let ctx = self.authorize(req, PERM_ACHIEVEMENT_CREATE).await?;
        let view = self
            .coordinator
            .create(&ctx, body.0)
            .await
            .map_err(AchievementApiError::from_internal_error)?;

        Ok(CreateAchievementResponse::Created(envelope(view)))
    }

    /// Upload an attachment file
    ///
    /// Accepts pdf, jpg, jpeg, png, doc and docx up to 10MB. The returned
    /// descriptor can be sent in the `attachments` of a create or update.
    #[oai(path = "/upload", method = "post", tag = "ApiTags::Achievements")]
    async fn upload(&self, req: &Request, form: UploadForm) -> Result<Json<AttachmentEnvelope>, AchievementApiError> {
        let ctx = self.authorize(req, PERM_ACHIEVEMENT_CREATE).await?;

        let file_name = form.file.file_name().unwrap_or_default().to_string();
        if file_name.is_empty() {
            return Err(AchievementApiError::validation_failed("File is required"));
        }
        if form.file.size() > MAX_UPLOAD_BYTES {
            return Err(AchievementApiError::validation_failed("File size exceeds the 10MB limit"));
        }

        let bytes = form.file.into_vec().await.map_err(|e| {
            tracing::debug!(request_id = %ctx.request_id, "Reading upload failed: {}", e);
            AchievementApiError::validation_failed("Failed to read uploaded file")
        })?;

        let attachment = self
            .coordinator
            .attach_file(&ctx, &file_name, &bytes)
            .await
            .map_err(AchievementApiError::from_internal_error)?;

        Ok(Json(AttachmentEnvelope {
            status: STATUS_SUCCESS.to_string(),
            data: AttachmentDto::from(&attachment),
        }))
    }

    /// Get a single achievement
    #[oai(path = "/:id", method = "get", tag = "ApiTags::Achievements")]
    async fn get(&self, req: &Request, id: Path<String>) -> Result<Json<AchievementEnvelope>, AchievementApiError> {
        let ctx = self.authorize(req, PERM_ACHIEVEMENT_READ).await?;
        let view = self
            .coordinator
            .get_by_id(&ctx, &id.0)
            .await
            .map_err(AchievementApiError::from_internal_error)?;

        Ok(envelope(view))
    }

    /// Partially update a draft achievement
    #[oai(path = "/:id", method = "put", tag = "ApiTags::Achievements")]
    async fn update(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<UpdateAchievementRequest>,
    ) -> Result<Json<AchievementEnvelope>, AchievementApiError> {
        let ctx = self.authorize(req, PERM_ACHIEVEMENT_UPDATE).await?;
        let view = self
            .coordinator
            .update(&ctx, &id.0, body.0)
            .await
            .map_err(AchievementApiError::from_internal_error)?;

        Ok(envelope(view))
    }

    /// Delete a draft achievement
    #[oai(path = "/:id", method = "delete", tag = "ApiTags::Achievements")]
    async fn delete(&self, req: &Request, id: Path<String>) -> Result<Json<MessageEnvelope>, AchievementApiError> {
        let ctx = self.authorize(req, PERM_ACHIEVEMENT_DELETE).await?;
        self.coordinator
            .delete(&ctx, &id.0)
            .await
            .map_err(AchievementApiError::from_internal_error)?;

        Ok(Json(MessageEnvelope::new("Achievement deleted")))
    }

    /// Submit a draft for verification
    #[oai(path = "/:id/submit", method = "post", tag = "ApiTags::Achievements")]
    async fn submit(&self, req: &Request, id: Path<String>) -> Result<Json<AchievementEnvelope>, AchievementApiError> {
        let ctx = self.authorize(req, PERM_ACHIEVEMENT_UPDATE).await?;
        let view = self
            .coordinator
            .submit(&ctx, &id.0)
            .await
            .map_err(AchievementApiError::from_internal_error)?;

        Ok(envelope(view))
    }

    /// Verify a submitted achievement
    #[oai(path = "/:id/verify", method = "post", tag = "ApiTags::Achievements")]
    async fn verify(&self, req: &Request, id: Path<String>) -> Result<Json<AchievementEnvelope>, AchievementApiError> {
        let ctx = self.authorize(req, PERM_ACHIEVEMENT_VERIFY).await?;
        let view = self
            .coordinator
            .verify(&ctx, &id.0)
            .await
            .map_err(AchievementApiError::from_internal_error)?;

        Ok(envelope(view))
    }

    /// Reject a submitted achievement
    #[oai(path = "/:id/reject", method = "post", tag = "ApiTags::Achievements")]
    async fn reject(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<RejectAchievementRequest>,
    ) -> Result<Json<AchievementEnvelope>, AchievementApiError> {
        let ctx = self.authorize(req, PERM_ACHIEVEMENT_VERIFY).await?;
        let view = self
            .coordinator
            .reject(&ctx, &id.0, &body.rejection_note)
            .await
            .map_err(AchievementApiError::from_internal_error)?;

        Ok(envelope(view))
    }
}
