pub mod collections;
pub mod mongo;
