//! Service layer providing the car/article/comment store operations on top of models.
//! - Every function takes the connection explicitly; nothing is ambient.
//! - Writes run inside a transaction scoped to the single operation, so a
//!   cascade either fully applies or not at all.
//! - Reuses validation and entity definitions in `models` crate.

pub mod errors;
#[cfg(test)]
pub mod test_support;
pub mod db;
