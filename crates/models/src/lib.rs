pub mod errors;
pub mod db;
pub mod car;
pub mod article;
pub mod comment;

#[cfg(test)]
mod tests;
