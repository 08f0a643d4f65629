use sha2::{Digest, Sha256};

use crate::config::MediaConfig;

/// Compute the upload signature for the media host: hex-encoded SHA-256 over
/// the parameter payload concatenated with the API secret.
pub fn sign_payload(payload: &str, api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Build a signed direct-upload URL for the configured media host.
pub fn signed_upload_url(media: &MediaConfig, timestamp: i64) -> String {
    let payload = format!("timestamp={timestamp}");
    let signature = sign_payload(&payload, &media.api_secret);
    format!(
        "{}/{}/auto/upload?api_key={}&timestamp={}&signature={}",
        media.base_url, media.cloud_name, media.api_key, timestamp, signature
    )
}
