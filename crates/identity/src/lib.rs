pub mod error;
pub mod identity;
pub mod server;
pub mod signing;
pub mod telemetry;

pub use error::ServerError;
pub use identity::IdentityRecord;
pub use server::{AppState, SIGNATURE_HEADER, router, run, serve};
pub use signing::{KeyProvider, SigningKey, StaticKey};
