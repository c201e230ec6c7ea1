mod common;

use achievement_backend::types::internal::{RequestContext, RequestSource};
use poem::Request;

#[test]
fn test_request_context_for_api_is_anonymous() {
    let ctx = RequestContext::for_api();

    assert_eq!(ctx.source, RequestSource::API);
    assert_eq!(ctx.actor_id, "anonymous");
    assert!(!ctx.authenticated);
    assert!(ctx.claims.is_none());
    assert!(ctx.require_claims().is_err());
}

#[test]
fn test_request_context_for_cli() {
    let ctx = RequestContext::for_cli("seed");

    assert_eq!(ctx.source, RequestSource::CLI);
    assert_eq!(ctx.actor_id, "cli:seed");
    assert!(ctx.ip_address.is_none());
}

#[test]
fn test_request_context_for_system() {
    let ctx = RequestContext::for_system("orphan_sweep");

    assert_eq!(ctx.source, RequestSource::System);
    assert_eq!(ctx.actor_id, "system:orphan_sweep");
}

#[tokio::test]
async fn test_validate_request_with_valid_bearer() {
    let app_data = common::setup_app_data().await;
    let (token, _jti) = app_data.token_provider.generate_jwt("user-1", common::ROLE_ID_STUDENT).unwrap();

    let req = Request::builder()
        .header("Authorization", format!("Bearer {}", token))
        .header("X-Forwarded-For", "10.1.2.3, 192.168.0.1")
        .finish();
    let ctx = RequestContext::validate_request(&req, &app_data.token_provider);

    assert!(ctx.authenticated);
    assert_eq!(ctx.actor_id, "user-1");
    assert_eq!(ctx.require_claims().unwrap().role_id, common::ROLE_ID_STUDENT);
    assert_eq!(ctx.ip_address, Some("10.1.2.3".parse().unwrap()));
}

#[tokio::test]
async fn test_validate_request_with_bad_bearer_stays_anonymous() {
    let app_data = common::setup_app_data().await;

    let req = Request::builder()
        .header("Authorization", "Bearer not-a-jwt")
        .header("X-Real-IP", "172.16.0.9")
        .finish();
    let ctx = RequestContext::validate_request(&req, &app_data.token_provider);

    assert!(!ctx.authenticated);
    assert!(ctx.claims.is_none());
    assert_eq!(ctx.ip_address, Some("172.16.0.9".parse().unwrap()));
}
