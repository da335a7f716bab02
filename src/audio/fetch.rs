use std::io::Read;
use std::time::Duration;

use crate::error::VisemeError;

/// Downloads a clip into memory. The buffer lives only as long as the caller
/// holds it; nothing is written to disk.
pub fn fetch_audio(url: &str, timeout: Duration, max_bytes: usize) -> Result<Vec<u8>, VisemeError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| VisemeError::fetch(url, e))?;
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| VisemeError::fetch(url, e))?;

    if let Some(len) = response.content_length() {
        if len > max_bytes as u64 {
            return Err(VisemeError::fetch(
                url,
                format!("response of {len} bytes exceeds limit of {max_bytes}"),
            ));
        }
    }

    let mut buf = Vec::new();
    response
        .take(max_bytes as u64 + 1)
        .read_to_end(&mut buf)
        .map_err(|e| VisemeError::fetch(url, e))?;
    if buf.len() > max_bytes {
        return Err(VisemeError::fetch(
            url,
            format!("response exceeds limit of {max_bytes} bytes"),
        ));
    }
    tracing::debug!(url, bytes = buf.len(), "audio fetched");
    Ok(buf)
}
