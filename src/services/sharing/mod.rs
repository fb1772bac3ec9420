pub mod resolver;
pub mod types;

pub use resolver::{AccessError, resolve};
pub use types::{ResourceAccess, RoleBinding, SharePolicy};

#[cfg(test)]
pub use types::{ShareRole, SubjectType};
