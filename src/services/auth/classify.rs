//! Classification of the recorded token error.
//!
//! The raw strings come from the token library (or the no-credential marker below).
//! They are turned into an `ErrorClass` exactly once, at the pipeline boundary.

/// Recorded when the request carried no credential at all.
pub const NO_TOKEN_ERROR: &str = "jwt must be provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Nothing was recorded (the token verified).
    None,
    /// No credential was supplied. Never blocks.
    NoToken,
    /// A credential was supplied and rejected. Blocks protected routes.
    AuthRequired,
}

pub fn classify(error: &str) -> ErrorClass {
    match error {
        "" => ErrorClass::None,
        NO_TOKEN_ERROR => ErrorClass::NoToken,
        _ => ErrorClass::AuthRequired,
    }
}

pub fn is_authentication_required(error: &str) -> bool {
    classify(error) == ErrorClass::AuthRequired
}

pub fn has_no_token(error: &str) -> bool {
    classify(error) == ErrorClass::NoToken
}
