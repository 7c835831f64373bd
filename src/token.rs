use password_hash::rand_core::{OsRng, RngCore};

/// `prefix` followed by `bytes` of OS randomness, hex encoded.
pub fn random_token(prefix: &str, bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    format!("{prefix}{}", hex::encode(buf))
}

/// Bearer secret handed to a merchant once, at registration.
pub fn generate_api_key() -> String {
    random_token("ucp_", 32)
}

pub fn generate_session_id() -> String {
    random_token("cs_", 16)
}
