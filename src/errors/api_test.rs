#[cfg(test)]
mod tests {
    use crate::errors::internal::{AchievementError, CredentialError, InternalError, ProfileError};
    use crate::errors::{AchievementApiError, AuthError};
    use sea_orm::DbErr;

    #[test]
    fn test_database_error_converts_to_internal_server_error() {
        let internal_err = InternalError::database("find_reference", DbErr::Custom("boom".into()));
        let api_err = AchievementApiError::from_internal_error(internal_err);

        assert!(matches!(api_err, AchievementApiError::InternalError(_)));
        assert_eq!(api_err.message(), "An internal error occurred");
    }

    #[test]
    fn test_taxonomy_maps_to_matching_variant() {
        let cases = vec![
            (AchievementError::unauthorized(), 401u16),
            (AchievementError::forbidden("nope"), 403),
            (AchievementError::not_found(), 404),
            (AchievementError::validation("title is required"), 400),
            (AchievementError::not_in_status("submitted", "draft"), 409),
        ];

        for (domain, expected) in cases {
            let message = domain.message().to_string();
            let api_err = AchievementApiError::from_internal_error(domain.into());
            let status = match &api_err {
                AchievementApiError::ValidationFailed(_) => 400,
                AchievementApiError::Unauthorized(_) => 401,
                AchievementApiError::Forbidden(_) => 403,
                AchievementApiError::NotFound(_) => 404,
                AchievementApiError::Conflict(_) => 409,
                AchievementApiError::InternalError(_) => 500,
            };
            assert_eq!(status, expected);
            assert_eq!(api_err.message(), message);
        }
    }

    #[test]
    fn test_envelope_shape() {
        let api_err = AchievementApiError::from_internal_error(AchievementError::not_found().into());
        match api_err {
            AchievementApiError::NotFound(json) => {
                assert_eq!(json.0.status, "error");
                assert_eq!(json.0.data.message, "Achievement not found");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_role_is_forbidden() {
        let internal_err = InternalError::Profile(ProfileError::RoleNotFound {
            role_id: "missing".to_string(),
        });
        let api_err = AchievementApiError::from_internal_error(internal_err);
        assert!(matches!(api_err, AchievementApiError::Forbidden(_)));
    }

    #[test]
    fn test_invalid_credentials_converts_correctly() {
        let auth_err = AuthError::from_internal_error(CredentialError::InvalidCredentials.into());
        assert_eq!(auth_err.message(), "Invalid username or password");
    }

    #[test]
    fn test_refresh_token_errors_convert_by_token_type() {
        let invalid = AuthError::from_internal_error(
            CredentialError::invalid_token("refresh_token", "not found").into(),
        );
        assert_eq!(invalid.message(), "Invalid refresh token");

        let expired = AuthError::from_internal_error(
            CredentialError::ExpiredToken("refresh_token".to_string()).into(),
        );
        assert_eq!(expired.message(), "Refresh token has expired");

        let expired_jwt =
            AuthError::from_internal_error(CredentialError::ExpiredToken("jwt".to_string()).into());
        assert_eq!(expired_jwt.message(), "JWT has expired");
    }

    #[test]
    fn test_auth_error_display_matches_message() {
        let auth_err = AuthError::missing_auth_header();
        assert_eq!(format!("{}", auth_err), "Authorization header is required");
    }
}
