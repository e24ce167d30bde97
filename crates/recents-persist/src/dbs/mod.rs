pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;
