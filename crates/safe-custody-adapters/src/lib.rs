pub mod codec;
pub mod config;
pub mod crypto;
pub mod hashing;

pub use config::CustodyAdapterConfig;
pub use crypto::{seed_from_phrase, verify_with_public_key, Ed25519HierarchicalPrivateKey};
pub use hashing::SafeUtilsHashingAdapter;
