mod caller;

pub use caller::{Authenticated, Caller, Grant};
