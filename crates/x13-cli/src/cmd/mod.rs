//! Command modules - one file per CLI command

pub mod build;
pub mod hash;
pub mod locate;
pub mod run;
