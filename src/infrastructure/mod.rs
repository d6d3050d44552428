//! Adapters implementing the collaborator ports.

pub mod fixture;
pub mod in_memory;
