//! Pieces shared by the server crate and the binary: logging setup and the
//! small response types that do not belong to any entity.

pub mod types;
pub mod utils;
