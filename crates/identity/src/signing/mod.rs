mod key;
mod mac;

pub use key::{KeyError, KeyProvider, SigningKey, StaticKey};
pub use mac::{MAC_LEN, SignatureError, compare, compute, decode_signature, encode_signature};
