pub mod memory;
pub mod store;

pub use memory::InMemoryVerificationStore;
pub use store::VerificationStore;
