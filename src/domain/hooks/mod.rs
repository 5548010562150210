//! Record Hooks
//!
//! Save and remove dispatch for every record kind the store holds. Each kind
//! has at most one registered [`RecordHooks`] handler which persists the
//! record and may run work before and after doing so.

mod errors;
pub mod handlers;
pub mod registry;

pub use errors::HooksError;
pub use handlers::*;
pub use registry::*;
