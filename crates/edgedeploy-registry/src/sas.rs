//! Shared access signature tokens for the registry REST API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded;

use crate::connection_string::ConnectionString;
use crate::error::RegistryError;

type HmacSha256 = Hmac<Sha256>;

/// Builds the `Authorization` header value for `connection`, valid until `expiry`
/// (seconds since the Unix epoch).
pub fn generate_token(connection: &ConnectionString, expiry: i64) -> Result<String, RegistryError> {
    let resource = encode(connection.host_name());
    let signature = sign(&resource, connection.shared_access_key(), expiry)?;

    Ok(format!(
        "SharedAccessSignature sr={}&sig={}&se={}&skn={}",
        resource,
        encode(&signature),
        expiry,
        encode(connection.shared_access_key_name())
    ))
}

/// Base64 HMAC-SHA256 over `"<encoded resource>\n<expiry>"`.
pub fn sign(encoded_resource: &str, key: &[u8], expiry: i64) -> Result<String, RegistryError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|err| RegistryError::InvalidConnectionString(err.to_string()))?;
    mac.update(format!("{encoded_resource}\n{expiry}").as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
