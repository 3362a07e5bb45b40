/// Database model definitions.
pub mod models;
/// Racha, member and attendance persistence.
pub mod racha_store;
/// Storage abstraction layer for database operations.
pub mod storage;
