//! Share-link encoding.
//!
//! A share token is the zlib-compressed JSON of a result, base64 encoded with
//! the URL-safe alphabet and no padding, so it can live in a URL fragment.
//! Decoding runs the same steps in reverse and reports the first stage that
//! fails as a corrupt token.

use crate::error::{DecodeStage, Error, Result};
use crate::models::AnalysisResult;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use tracing::debug;

/// Encode a result as a URL-safe share token.
pub fn encode(result: &AnalysisResult) -> Result<String> {
    let json = result.to_json()?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json.as_bytes())?;
    let compressed = encoder.finish()?;

    let token: String = STANDARD
        .encode(compressed)
        .chars()
        .filter(|c| *c != '=')
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    debug!(
        "Encoded {} bytes of JSON into a {}-character share token",
        json.len(),
        token.len()
    );

    Ok(token)
}

/// Decode a share token back into a result.
pub fn decode(token: &str) -> Result<AnalysisResult> {
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::corrupt_token(DecodeStage::Base64, "empty token"));
    }

    let mut standard: String = token
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while standard.len() % 4 != 0 {
        standard.push('=');
    }

    let compressed = STANDARD
        .decode(standard.as_bytes())
        .map_err(|e| Error::corrupt_token(DecodeStage::Base64, e))?;

    // The FLEVEL bits of the zlib header are informational and not verified,
    // so an edit confined to them decodes to the same result. Every other
    // bit is covered by the header check, the deflate stream or adler32.
    let mut json = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(|e| Error::corrupt_token(DecodeStage::Inflate, e))?;

    // Invalid UTF-8 is rejected here too.
    let result: AnalysisResult =
        serde_json::from_slice(&json).map_err(|e| Error::corrupt_token(DecodeStage::Json, e))?;

    debug!(
        "Decoded share token into {} themes and {} insights",
        result.themes.len(),
        result.insights.len()
    );

    Ok(result)
}

/// Build a share link by putting the token in the fragment of `base_url`.
///
/// Any fragment already on `base_url` is replaced.
pub fn share_url(base_url: &str, result: &AnalysisResult) -> Result<String> {
    let base = base_url
        .split_once('#')
        .map(|(base, _)| base)
        .unwrap_or(base_url);
    Ok(format!("{}#{}", base, encode(result)?))
}

/// Extract the token from a share link; a bare token is returned unchanged.
pub fn token_from_link(link: &str) -> &str {
    match link.split_once('#') {
        Some((_, fragment)) => fragment.trim(),
        None => link.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AnalysisMode, CategorizedComment, Insight, Sentiment, SentimentCounts, Theme,
    };

    fn full_result() -> AnalysisResult {
        AnalysisResult {
            survey_question: Some("What should we improve? (be honest)".to_string()),
            themes: vec![
                Theme::new("Onboarding", SentimentCounts::new(5, 2, 1, 0)),
                Theme::new("Support, \"tier 2\"", SentimentCounts::new(1, 1, 8, 3)),
            ],
            insights: vec![Insight {
                insight: "Support wait times drive churn".to_string(),
                recommendation: "Staff the queue at peak hours".to_string(),
                quotes: vec!["waited 3 days".to_string(), "no reply ☹".to_string()],
                related_theme: Some("Support, \"tier 2\"".to_string()),
            }],
            comments: Some(vec![CategorizedComment {
                text: "line one\nline two".to_string(),
                theme: "Onboarding".to_string(),
                sentiment: Sentiment::Mixed,
            }]),
            analysis_mode: AnalysisMode::SentimentOnly,
        }
    }

    fn empty_result() -> AnalysisResult {
        AnalysisResult {
            themes: vec![],
            insights: vec![],
            analysis_mode: AnalysisMode::Both,
            ..Default::default()
        }
    }

    #[test]
    fn test_round_trip_full_result() {
        let result = full_result();
        let token = encode(&result).unwrap();
        assert_eq!(decode(&token).unwrap(), result);
    }

    #[test]
    fn test_round_trip_every_mode() {
        for mode in [
            AnalysisMode::Both,
            AnalysisMode::ThemeOnly,
            AnalysisMode::SentimentOnly,
        ] {
            let result = AnalysisResult {
                analysis_mode: mode,
                comments: None,
                survey_question: None,
                ..full_result()
            };
            assert_eq!(decode(&encode(&result).unwrap()).unwrap(), result);
        }
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = encode(&full_result()).unwrap();
        assert!(!token.is_empty());
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_decode_token_from_standard_pipeline() {
        // Built the long way: standard base64 with padding, then made URL-safe.
        let json = r#"{"themes":[],"insights":[],"analysisType":"theme-only"}"#;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(json.as_bytes()).unwrap();
        let padded = STANDARD.encode(encoder.finish().unwrap());
        let token = padded
            .replace('+', "-")
            .replace('/', "_")
            .trim_end_matches('=')
            .to_string();

        let result = decode(&token).unwrap();
        assert_eq!(result.analysis_mode, AnalysisMode::ThemeOnly);
        assert!(result.themes.is_empty());
    }

    #[test]
    fn test_corrupted_character_is_rejected() {
        let token = encode(&empty_result()).unwrap();
        let mid = token.len() / 2;
        let original = token.as_bytes()[mid];
        let replacement = if original == b'A' { 'B' } else { 'A' };

        let mut corrupted = token.clone();
        corrupted.replace_range(mid..mid + 1, &replacement.to_string());
        assert_ne!(corrupted, token);

        let err = decode(&corrupted).unwrap_err();
        assert!(err.is_corrupt_share_token());
    }

    #[test]
    fn test_invalid_alphabet_is_base64_failure() {
        let token = encode(&empty_result()).unwrap();
        let corrupted = format!("{}!{}", &token[..4], &token[5..]);

        let err = decode(&corrupted).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptShareToken {
                stage: DecodeStage::Base64,
                ..
            }
        ));
    }

    #[test]
    fn test_non_zlib_payload_is_inflate_failure() {
        let token = STANDARD
            .encode(b"definitely not compressed")
            .trim_end_matches('=')
            .to_string();

        let err = decode(&token).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptShareToken {
                stage: DecodeStage::Inflate,
                ..
            }
        ));
    }

    #[test]
    fn test_structurally_invalid_json_is_json_failure() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"themes":[]}"#).unwrap();
        let token = STANDARD
            .encode(encoder.finish().unwrap())
            .replace('+', "-")
            .replace('/', "_")
            .trim_end_matches('=')
            .to_string();

        let err = decode(&token).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptShareToken {
                stage: DecodeStage::Json,
                ..
            }
        ));
        assert_eq!(err.user_message(), crate::error::CORRUPT_LINK_MESSAGE);
    }

    /// Re-encode raw bytes in the token alphabet.
    fn to_token(bytes: &[u8]) -> String {
        STANDARD
            .encode(bytes)
            .replace('+', "-")
            .replace('/', "_")
            .trim_end_matches('=')
            .to_string()
    }

    #[test]
    fn test_invalid_utf8_is_json_failure() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(b"{\"surveyQuestion\":\"\xff\xfe\",\"themes\":[],\"insights\":[]}")
            .unwrap();
        let token = to_token(&encoder.finish().unwrap());

        let err = decode(&token).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptShareToken {
                stage: DecodeStage::Json,
                ..
            }
        ));
    }

    #[test]
    fn test_header_level_bits_do_not_change_result() {
        let result = full_result();
        let token = encode(&result).unwrap();
        let mut padded = token.replace('-', "+").replace('_', "/");
        while padded.len() % 4 != 0 {
            padded.push('=');
        }
        let mut compressed = STANDARD.decode(padded).unwrap();
        assert_eq!(&compressed[..2], &[0x78, 0x9c]);

        // Same stream, header claiming maximum compression.
        compressed[1] = 0xda;
        assert_eq!(decode(&to_token(&compressed)).unwrap(), result);

        // A header that fails its own check is rejected.
        compressed[1] = 0xdb;
        assert!(decode(&to_token(&compressed))
            .unwrap_err()
            .is_corrupt_share_token());
    }

    #[test]
    fn test_empty_token_is_corrupt() {
        assert!(decode("").unwrap_err().is_corrupt_share_token());
        assert!(decode("   ").unwrap_err().is_corrupt_share_token());
    }

    #[test]
    fn test_share_url_replaces_fragment() {
        let result = empty_result();
        let url = share_url("https://survey.example/app?x=1#old", &result).unwrap();

        assert!(url.starts_with("https://survey.example/app?x=1#"));
        assert!(!url.contains("#old"));
        assert_eq!(decode(token_from_link(&url)).unwrap(), result);
    }

    #[test]
    fn test_token_from_link_accepts_bare_token() {
        assert_eq!(token_from_link("  eJyrVg  "), "eJyrVg");
        assert_eq!(token_from_link("https://a.example/#eJyrVg"), "eJyrVg");
    }
}
