//! Per-request authentication decision.
//!
//! `Start → (PublicSkip | Evaluate) → (Blocked | Proceed)`
//!
//! - public route: proceed without looking at the credential at all
//! - `AuthRequired`: blocked (401), terminal for the request
//! - `NoToken`: stored identity is reset, the request continues anonymously
//! - claims present: identity is extracted once and written into the context

use tracing::{debug, warn};

use crate::services::auth::classify::{ErrorClass, classify};
use crate::services::auth::claims::{extract_email, extract_roles, extract_user_id};
use crate::services::auth::context::RequestContext;
use crate::services::auth::error::AuthError;
use crate::services::auth::routes::RoutePolicy;
use crate::services::auth::token::TokenOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Blocked,
}

#[derive(Debug, Clone)]
pub struct AuthPipeline {
    routes: RoutePolicy,
}

impl AuthPipeline {
    pub fn new(routes: RoutePolicy) -> Self {
        Self { routes }
    }

    /// Run the whole pipeline for `path`.
    ///
    /// `capture` locates and validates the credential; it is only called for
    /// protected routes.
    pub fn authorize<F>(&self, path: &str, capture: F) -> Result<RequestContext, AuthError>
    where
        F: FnOnce() -> Result<TokenOutcome, AuthError>,
    {
        if self.routes.is_public_route(path) {
            debug!(path, "public route, skipping credential inspection");
            return Ok(RequestContext::new());
        }

        let mut ctx = RequestContext::from_outcome(capture()?);
        match self.evaluate(path, &mut ctx) {
            Decision::Proceed => Ok(ctx),
            Decision::Blocked => Err(AuthError::AuthenticationRequired),
        }
    }

    /// Steps 1-4 over an already populated context.
    pub fn evaluate(&self, path: &str, ctx: &mut RequestContext) -> Decision {
        if self.routes.is_public_route(path) {
            return Decision::Proceed;
        }

        match classify(ctx.jwt_error()) {
            ErrorClass::AuthRequired => {
                warn!(path, error = %ctx.jwt_error(), "access token rejected");
                return Decision::Blocked;
            }
            // Optional authentication: a protected route without any credential
            // continues anonymously. Resource-level checks decide later.
            ErrorClass::NoToken => ctx.clear_identity(),
            ErrorClass::None => {}
        }

        let Some(claims) = ctx.claims() else {
            return Decision::Proceed;
        };

        let user_id = extract_user_id(claims);
        let roles = extract_roles(claims);
        let email = extract_email(claims);

        if !user_id.is_empty() {
            ctx.set_user_id(user_id);
        }
        if let Some(roles) = roles {
            ctx.set_roles(roles);
        }
        if let Some(email) = email {
            ctx.set_email(email);
        }

        Decision::Proceed
    }
}
