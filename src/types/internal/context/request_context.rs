use std::net::IpAddr;

use crate::{errors::InternalError, providers::TokenProvider, types::internal::auth::Claims};
use poem::Request;
use poem_openapi::auth::{Bearer, BearerAuthorization};

use super::{request_id::RequestId, request_source::RequestSource};

/// Request context that flows through all layers
///
/// Contains contextual information about the current request that is needed
/// for logging and tracing across API, coordinator, and store layers.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// IP address of the client making the request
    pub ip_address: Option<IpAddr>,

    /// Unique identifier for this request (for tracing across layers)
    pub request_id: RequestId,

    /// Whether the request is authenticated (JWT validated successfully)
    pub authenticated: bool,

    /// Full JWT claims if authenticated
    pub claims: Option<Claims>,

    /// Source of the request (API, CLI, or System)
    pub source: RequestSource,

    /// Actor who initiated the operation
    pub actor_id: String,
}

impl RequestContext {
    /// Create an unauthenticated RequestContext for API requests
    pub fn for_api() -> Self {
        Self {
            ip_address: None,
            request_id: RequestId::new(),
            authenticated: false,
            claims: None,
            source: RequestSource::API,
            actor_id: "anonymous".to_owned(),
        }
    }

    /// Create a RequestContext for CLI operations
    pub fn for_cli(command_name: &str) -> Self {
        Self {
            ip_address: None,
            request_id: RequestId::new(),
            authenticated: false,
            claims: None,
            source: RequestSource::CLI,
            actor_id: format!("cli:{}", command_name),
        }
    }

    /// Create a RequestContext for system operations
    pub fn for_system(operation_name: &str) -> Self {
        Self {
            ip_address: None,
            request_id: RequestId::new(),
            authenticated: false,
            claims: None,
            source: RequestSource::System,
            actor_id: format!("system:{}", operation_name),
        }
    }

    /// Extract IP address from request headers
    ///
    /// Checks X-Forwarded-For, X-Real-IP, and falls back to remote address.
    fn extract_ip_address(req: &Request) -> Option<IpAddr> {
        if let Some(forwarded) = req.header("X-Forwarded-For") {
            if let Some(ip) = forwarded.split(',').next() {
                return ip.trim().parse().ok();
            }
        }

        if let Some(real_ip) = req.header("X-Real-IP") {
            return real_ip.parse().ok();
        }

        req.remote_addr().as_socket_addr().map(|addr| addr.ip())
    }

    /// Create RequestContext from an incoming request
    ///
    /// Call at the beginning of every endpoint. If a bearer token is present and
    /// valid the context is authenticated; an invalid or expired token leaves the
    /// context anonymous and the endpoint decides whether that is acceptable.
    pub fn validate_request(req: &Request, token_provider: &TokenProvider) -> Self {
        let mut ctx = Self::for_api();
        if let Some(ip) = Self::extract_ip_address(req) {
            ctx = ctx.with_ip_address(ip);
        }

        if let Ok(bearer) = Bearer::from_request(req) {
            match token_provider.validate_jwt(&bearer.token) {
                Ok(claims) => {
                    let sub = claims.sub.clone();
                    ctx = ctx.with_auth(claims).with_actor_id(sub);
                }
                Err(err) => {
                    tracing::debug!("Bearer token rejected: {}", err);
                }
            }
        }

        tracing::trace!("Request context created: {:?}", ctx);
        ctx
    }

    /// Set the ip_address
    pub fn with_ip_address(mut self, ip_address: IpAddr) -> Self {
        self.ip_address = Some(ip_address);
        self
    }

    /// Set authentication state with claims
    pub fn with_auth(mut self, claims: Claims) -> Self {
        self.authenticated = true;
        self.claims = Some(claims);
        self
    }

    /// Set the actor_id
    pub fn with_actor_id(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = actor_id.into();
        self
    }

    /// Validated claims of the caller, or Unauthorized
    pub fn require_claims(&self) -> Result<&Claims, InternalError> {
        match (&self.claims, self.authenticated) {
            (Some(claims), true) => Ok(claims),
            _ => Err(crate::errors::AchievementError::unauthorized().into()),
        }
    }
}
