pub mod classify;
pub mod claims;
pub mod context;
pub mod credentials;
pub mod error;
pub mod factory;
pub mod issuer;
pub mod pipeline;
pub mod routes;
pub mod service;
pub mod token;

pub use claims::Identity;
pub use context::RequestContext;
pub use error::AuthError;
pub use factory::build_auth_service;
pub use service::AuthService;
