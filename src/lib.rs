pub mod authz;
pub mod errors;
pub mod events;
pub mod store;
pub mod utils;

// Re-export commonly used items for tests and the CLI
pub use authz::engine::{AccessRequest, Decision, Operation, RulesEngine};
pub use authz::identity::{Identity, Principal, Role};
pub use authz::{Document, RulesMode};
pub use errors::{StoreError, StoreResult};
pub use store::{DocumentStore, MemoryStore};
