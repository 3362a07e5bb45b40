pub mod health;
pub mod profile;
pub mod racha;
pub mod sse;
pub mod validation;
