//! IO modules - side effects (network, in-memory archives)

pub mod archive;
pub mod download;
