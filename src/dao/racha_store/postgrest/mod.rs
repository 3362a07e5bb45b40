mod error;
mod store;

pub use error::PostgrestError;
pub use store::PostgrestRachaStore;
