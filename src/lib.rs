pub mod common;
pub mod error;
pub mod flb3;
pub mod metadata;
pub mod report;
