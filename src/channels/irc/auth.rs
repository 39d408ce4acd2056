use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// SASL PLAIN payload (`\0 authcid \0 password`, empty authzid), base64-encoded.
pub(super) fn encode_sasl_plain(nick: &str, password: &str) -> String {
    STANDARD.encode(format!("\0{nick}\0{password}"))
}
