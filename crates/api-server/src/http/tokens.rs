use sha2::{Digest, Sha256};
use uuid::Uuid;

pub(super) const ACCESS_TOKEN_PREFIX: &str = "bca";

pub(super) fn hash_token(value: &str) -> Vec<u8> {
    Sha256::digest(value.as_bytes()).to_vec()
}

pub(super) fn generate_access_token() -> String {
    format!(
        "{ACCESS_TOKEN_PREFIX}_{}_{}",
        Uuid::new_v4().as_simple(),
        Uuid::new_v4().as_simple()
    )
}
