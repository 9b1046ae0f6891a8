use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// MIME type for a lower-cased extension (without the dot). Unknown
/// extensions fall back to PNG.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "image/png",
    }
}

/// Encode raw bytes as a `data:<mime>;base64,<payload>` URI.
pub fn encode_bytes(bytes: &[u8], ext: &str) -> String {
    let mime = mime_for_extension(&ext.to_ascii_lowercase());
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Read a whole file and encode it as a data URI. The MIME type comes from
/// the file extension.
pub fn encode_file(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(encode_bytes(&bytes, &ext))
}

/// Approximate decoded size of a data URI's payload.
pub fn estimated_payload_bytes(data_uri: &str) -> usize {
    let payload = data_uri
        .split_once(";base64,")
        .map(|(_, p)| p)
        .unwrap_or(data_uri);
    payload.len() * 3 / 4
}
