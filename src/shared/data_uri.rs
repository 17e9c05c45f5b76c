//! Audio interchange format: `data:<mime>;base64,<payload>`.
//!
//! Produced by the microphone recorder and consumed unchanged by the
//! transcription flow. Parsing is strict: a missing scheme, MIME type,
//! base64 marker, or payload is rejected.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// A parsed `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    /// Base64-encoded payload, exactly as carried in the URI.
    pub base64_payload: String,
}

impl DataUri {
    /// Decode the payload to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, String> {
        STANDARD
            .decode(&self.base64_payload)
            .map_err(|e| format!("invalid base64 payload: {}", e))
    }
}

/// Parse a `data:<mime>;base64,<payload>` string.
pub fn parse(uri: &str) -> Result<DataUri, String> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| "missing 'data:' scheme".to_string())?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "missing ',' separator".to_string())?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| "missing ';base64' marker".to_string())?;
    if mime_type.is_empty() {
        return Err("missing MIME type".to_string());
    }
    if payload.is_empty() {
        return Err("empty payload".to_string());
    }
    Ok(DataUri {
        mime_type: mime_type.to_string(),
        base64_payload: payload.to_string(),
    })
}

/// Encode raw bytes as a `data:` URI with the given MIME type.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_parse_round_trip() {
        let uri = encode("audio/wav", b"RIFF....");
        let parsed = parse(&uri).unwrap();
        assert_eq!(parsed.mime_type, "audio/wav");
        assert_eq!(parsed.decode().unwrap(), b"RIFF....");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse("audio/wav;base64,AAAA").is_err());
        assert!(parse("data:audio/wav,AAAA").is_err());
        assert!(parse("data:;base64,AAAA").is_err());
        assert!(parse("data:audio/wav;base64,").is_err());
        assert!(parse("data:audio/wav;base64AAAA").is_err());
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let parsed = parse("data:audio/webm;base64,!!!!").unwrap();
        assert!(parsed.decode().is_err());
    }
}
