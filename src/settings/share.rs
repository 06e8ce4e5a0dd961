//! Share links: the whole settings record packed into one query parameter.
//!
//! The token is URL-safe base64 (no padding) of the settings JSON. Applying a
//! link is one-shot: the caller replaces its settings with the decoded record
//! and continues with the address returned in [`ShareLinkOutcome::address`],
//! which no longer carries the parameter.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tracing::warn;

use super::Settings;
use crate::error::{Result, SpError};

/// Query parameter carrying the token.
pub const SHARE_PARAM: &str = "config";

/// Result of consuming a share link.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareLinkOutcome {
    /// Decoded settings; `None` when the link had no token or it was malformed.
    pub settings: Option<Settings>,
    /// The address with the token parameter stripped.
    pub address: String,
}

/// Encode settings as a share token.
pub fn encode_token(settings: &Settings) -> Result<String> {
    let json = serde_json::to_vec(settings)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a share token back into settings.
pub fn decode_token(token: &str) -> Result<Settings> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim().trim_end_matches('='))
        .map_err(|e| SpError::ShareLink(format!("token is not base64: {e}")))?;
    let settings: Settings = serde_json::from_slice(&bytes)
        .map_err(|e| SpError::ShareLink(format!("token is not a settings record: {e}")))?;
    Ok(settings.sanitized())
}

/// Build a share link by appending the token to `base`.
pub fn share_link(base: &str, settings: &Settings) -> Result<String> {
    let token = encode_token(settings)?;
    let (without_fragment, fragment) = split_fragment(base);
    let separator = if without_fragment.contains('?') {
        if without_fragment.ends_with('?') || without_fragment.ends_with('&') {
            ""
        } else {
            "&"
        }
    } else {
        "?"
    };
    Ok(format!(
        "{without_fragment}{separator}{SHARE_PARAM}={token}{fragment}"
    ))
}

/// Extract and strip the token from `address`.
///
/// A malformed token is logged and ignored: `settings` is `None` but the
/// parameter is still stripped so it is not retried on the next load.
#[must_use]
pub fn consume_share_link(address: &str) -> ShareLinkOutcome {
    let (without_fragment, fragment) = split_fragment(address);
    let Some((path, query)) = without_fragment.split_once('?') else {
        return ShareLinkOutcome {
            settings: None,
            address: address.to_string(),
        };
    };

    let mut token = None;
    let mut kept = Vec::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == SHARE_PARAM && token.is_none() {
            token = Some(value);
        } else if key != SHARE_PARAM {
            kept.push(pair);
        }
    }

    let settings = token.and_then(|raw| {
        let raw = urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |v| v.into_owned());
        match decode_token(&raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed share link");
                None
            }
        }
    });

    let address = if kept.is_empty() {
        format!("{path}{fragment}")
    } else {
        format!("{path}?{}{fragment}", kept.join("&"))
    };

    ShareLinkOutcome { settings, address }
}

fn split_fragment(address: &str) -> (&str, &str) {
    address
        .find('#')
        .map_or((address, ""), |idx| address.split_at(idx))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn full_settings() -> Settings {
        Settings {
            host: "https://ms-1234.example.io".to_string(),
            api_key: "searchKey+/=".to_string(),
            index: "movies".to_string(),
            embedder: "openai".to_string(),
            hybrid_ratio: 0.8,
            title_attr: "title".to_string(),
            desc_attr: "overview".to_string(),
            image_attr: "poster".to_string(),
        }
    }

    #[test]
    fn token_roundtrip_preserves_all_fields() {
        let settings = full_settings();
        let token = encode_token(&settings).unwrap();
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
        assert!(!token.contains('='));
        assert_eq!(decode_token(&token).unwrap(), settings);
    }

    #[test]
    fn link_roundtrip_and_one_shot_strip() {
        let settings = full_settings();
        let link = share_link("http://localhost:3000/", &settings).unwrap();
        assert!(link.starts_with("http://localhost:3000/?config="));

        let outcome = consume_share_link(&link);
        assert_eq!(outcome.settings, Some(settings));
        assert_eq!(outcome.address, "http://localhost:3000/");

        // Re-consuming the stripped address applies nothing.
        let again = consume_share_link(&outcome.address);
        assert_eq!(again.settings, None);
        assert_eq!(again.address, "http://localhost:3000/");
    }

    #[test]
    fn strip_keeps_other_params_and_fragment() {
        let settings = full_settings();
        let link = share_link("http://demo/search?lang=en#results", &settings).unwrap();
        assert!(link.ends_with("#results"));
        assert!(link.contains("?lang=en&config="));

        let outcome = consume_share_link(&link);
        assert_eq!(outcome.settings, Some(settings));
        assert_eq!(outcome.address, "http://demo/search?lang=en#results");
    }

    #[test]
    fn malformed_token_is_ignored_but_stripped() {
        let outcome = consume_share_link("http://demo/?config=%%%not-a-token&x=1");
        assert_eq!(outcome.settings, None);
        assert_eq!(outcome.address, "http://demo/?x=1");

        let not_json = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        let outcome = consume_share_link(&format!("http://demo/?config={not_json}"));
        assert_eq!(outcome.settings, None);
    }

    #[test]
    fn decode_accepts_padded_tokens() {
        let settings = full_settings();
        let padded = base64::engine::general_purpose::URL_SAFE
            .encode(serde_json::to_vec(&settings).unwrap());
        assert_eq!(decode_token(&padded).unwrap(), settings);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_token("!!!").unwrap_err();
        assert!(matches!(err, SpError::ShareLink(_)));
    }

    #[test]
    fn address_without_query_is_untouched() {
        let outcome = consume_share_link("http://demo/page#top");
        assert_eq!(outcome.settings, None);
        assert_eq!(outcome.address, "http://demo/page#top");
    }

    proptest! {
        #[test]
        fn token_roundtrip_any_settings(
            host in ".{0,40}",
            api_key in ".{0,40}",
            index in "[a-z0-9_-]{0,20}",
            embedder in ".{0,20}",
            tenths in 0u8..=10,
            title in ".{0,20}",
            desc in ".{0,20}",
            image in ".{0,20}",
        ) {
            let settings = Settings {
                host,
                api_key,
                index,
                embedder,
                hybrid_ratio: f64::from(tenths) / 10.0,
                title_attr: title,
                desc_attr: desc,
                image_attr: image,
            };
            let link = share_link("http://localhost:3000/", &settings).unwrap();
            let outcome = consume_share_link(&link);
            prop_assert_eq!(outcome.settings, Some(settings));
        }
    }
}
