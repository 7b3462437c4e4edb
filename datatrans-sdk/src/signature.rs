//! Signature parsing and verification for Datatrans webhooks.
//!
//! Datatrans signs every webhook it delivers with the merchant's Sign2 HMAC
//! key. The wire format for the header is:
//!
//! ```text
//! Datatrans-Signature: t={timestamp},s0={hex_hmac}
//! ```
//!
//! The signed material is `HMAC-SHA256("{timestamp}{raw_body}", key)`: the
//! timestamp digits followed immediately by the raw request body, without a
//! separator.
//!
//! The timestamp only feeds the HMAC. Its age is never checked, so a captured
//! webhook stays valid for as long as the key does.

use ring::hmac;
use subtle::ConstantTimeEq;

/// Header name carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "Datatrans-Signature";

/// Length of the `t=` prefix in front of the timestamp.
const TIMESTAMP_PREFIX_LEN: usize = 2;

/// Length of the `,s0=` prefix in front of the hash, counted from the comma.
const HASH_PREFIX_LEN: usize = 4;

/// Errors produced while building a [`WebhookKey`].
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("failed to hex decode webhook sign key: {0}")]
    InvalidKey(#[from] hex::FromHexError),
}

// ---------------------------------------------------------------------------
// Header parsing / formatting
// ---------------------------------------------------------------------------

/// The two values carried by a `Datatrans-Signature` header.
///
/// An empty `timestamp` or an empty `hash` means the header did not carry a
/// usable signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureHeader<'a> {
    pub timestamp: &'a str,
    pub hash: Vec<u8>,
}

impl SignatureHeader<'_> {
    /// Whether both the timestamp and the hash are present.
    pub fn is_complete(&self) -> bool {
        !self.timestamp.is_empty() && !self.hash.is_empty()
    }
}

/// Parse a `Datatrans-Signature` header value.
///
/// The layout is fixed: the timestamp starts two bytes in (after `t=`) and
/// ends at the first comma, the hash starts four bytes after that comma
/// (after `,s0=`). The prefixes themselves are not inspected.
///
/// Never fails. Anything that does not fit the layout yields an empty
/// [`SignatureHeader`]; a hash that is not valid hex yields an empty hash.
pub fn parse_signature_header(value: &str) -> SignatureHeader<'_> {
    if value.is_empty() {
        return SignatureHeader::default();
    }

    let comma = match value.find(',') {
        Some(idx) if idx > 0 => idx,
        _ => return SignatureHeader::default(),
    };

    // `None` for `t,` (start past the comma) or a prefix that splits a char.
    let Some(timestamp) = value.get(TIMESTAMP_PREFIX_LEN..comma) else {
        return SignatureHeader::default();
    };

    if value.len() < comma + HASH_PREFIX_LEN {
        return SignatureHeader::default();
    }

    let hash = value
        .get(comma + HASH_PREFIX_LEN..)
        .and_then(|hex_hash| hex::decode(hex_hash).ok())
        .unwrap_or_default();

    SignatureHeader { timestamp, hash }
}

/// Format a `t={timestamp},s0={hex}` header value from its parts.
pub fn format_signature_header(timestamp: &str, hash: &[u8]) -> String {
    format!("t={timestamp},s0={}", hex::encode(hash))
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// The merchant's HMAC-SHA256 webhook key.
///
/// Built once from the hex string shown in the Datatrans back office and
/// shared read-only between requests.
#[derive(Clone)]
pub struct WebhookKey {
    key: hmac::Key,
}

impl WebhookKey {
    /// Build a key from raw bytes.
    pub fn new(raw: &[u8]) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, raw),
        }
    }

    /// Build a key from its hexadecimal representation.
    pub fn from_hex(hex_key: &str) -> Result<Self, SignatureError> {
        let raw = hex::decode(hex_key)?;
        Ok(Self::new(&raw))
    }

    /// Start an incremental HMAC seeded with the timestamp bytes.
    pub fn accumulator(&self, timestamp: &str) -> SignatureAccumulator {
        let mut ctx = hmac::Context::with_key(&self.key);
        ctx.update(timestamp.as_bytes());
        SignatureAccumulator { ctx }
    }

    /// Check `claimed` against `HMAC-SHA256("{timestamp}{body}", key)`.
    pub fn verify(&self, timestamp: &str, body: &[u8], claimed: &[u8]) -> bool {
        let mut acc = self.accumulator(timestamp);
        acc.update(body);
        acc.verify(claimed)
    }

    /// Produce the full header value Datatrans would send for `body`.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> String {
        let mut acc = self.accumulator(timestamp);
        acc.update(body);
        format_signature_header(timestamp, acc.finish().as_ref())
    }
}

impl std::fmt::Debug for WebhookKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookKey").finish_non_exhaustive()
    }
}

/// An HMAC computation fed chunk by chunk while a body is streamed.
#[derive(Clone)]
pub struct SignatureAccumulator {
    ctx: hmac::Context,
}

impl SignatureAccumulator {
    pub fn update(&mut self, chunk: &[u8]) {
        self.ctx.update(chunk);
    }

    pub fn finish(self) -> hmac::Tag {
        self.ctx.sign()
    }

    /// Compare the computed tag with `claimed` in constant time.
    ///
    /// Operands of different lengths compare unequal.
    pub fn verify(self, claimed: &[u8]) -> bool {
        let tag = self.finish();
        tag.as_ref().ct_eq(claimed).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "617364666173645e25405e26256661";
    const TIMESTAMP: &str = "1559303131511";
    const BODY: &str = r#"{"transactionId": "210215103042148501"}"#;

    fn reference_hmac(body: &[u8]) -> Vec<u8> {
        let key = hmac::Key::new(hmac::HMAC_SHA256, b"asdfasd^%@^&%fa");
        let mut data = TIMESTAMP.as_bytes().to_vec();
        data.extend_from_slice(body);
        hmac::sign(&key, &data).as_ref().to_vec()
    }

    #[test]
    fn test_parse_signature_header() {
        let cases: &[(&str, &str, &str, &[u8])] = &[
            (
                "ok",
                "t=1559303131511,s0=33819a1220fd8e38fc5bad3f57ef31095fac0deb38c001ba347e694f48ffe2fc",
                "1559303131511",
                &[
                    0x33, 0x81, 0x9a, 0x12, 0x20, 0xfd, 0x8e, 0x38, 0xfc, 0x5b, 0xad, 0x3f, 0x57,
                    0xef, 0x31, 0x09, 0x5f, 0xac, 0x0d, 0xeb, 0x38, 0xc0, 0x01, 0xba, 0x34, 0x7e,
                    0x69, 0x4f, 0x48, 0xff, 0xe2, 0xfc,
                ],
            ),
            ("empty vals", "t=,s0=", "", &[]),
            ("empty", "", "", &[]),
            ("missing comma", "t=1559303131511s0=33", "", &[]),
            ("comma begin", ",t=1559303131511s0=33", "", &[]),
            ("comma end", "t=1559303131511s0=33,", "", &[]),
            ("comma only", ",", "", &[]),
            ("comma before prefix end", "t,s0=33", "", &[]),
        ];

        for (name, header, want_ts, want_hash) in cases {
            let parsed = parse_signature_header(header);
            assert_eq!(parsed.timestamp, *want_ts, "case {name}: timestamp");
            assert_eq!(parsed.hash, *want_hash, "case {name}: hash");
        }
    }

    #[test]
    fn test_parse_invalid_hex_yields_empty_hash() {
        let parsed = parse_signature_header("t=1559303131511,s0=zz12");
        assert_eq!(parsed.timestamp, "1559303131511");
        assert!(parsed.hash.is_empty());
        assert!(!parsed.is_complete());

        // odd-length hex is not decodable either
        let parsed = parse_signature_header("t=1,s0=abc");
        assert!(parsed.hash.is_empty());
    }

    #[test]
    fn test_parse_ignores_prefix_contents() {
        // the four skipped bytes include the comma
        let parsed = parse_signature_header("xx42,yyyab");
        assert_eq!(parsed.timestamp, "42");
        assert_eq!(parsed.hash, vec![0xab]);

        let parsed = parse_signature_header("xx42,yyyyab");
        assert_eq!(parsed.timestamp, "42");
        assert!(parsed.hash.is_empty());
    }

    #[test]
    fn test_header_round_trip() {
        for header in [
            "t=1559303131511,s0=33819a1220fd8e38fc5bad3f57ef31095fac0deb38c001ba347e694f48ffe2fc",
            "t=1,s0=00",
            "t=9999999999999,s0=DEADBEEF",
        ] {
            let parsed = parse_signature_header(header);
            assert!(parsed.is_complete());
            let reformatted = format_signature_header(parsed.timestamp, &parsed.hash);
            assert_eq!(parse_signature_header(&reformatted), parsed);
        }
    }

    #[test]
    fn test_generated_headers_round_trip() {
        let timestamps = ["0", "7", "1559303131511", "18446744073709551615"];
        for timestamp in timestamps {
            for len in [1usize, 2, 16, 32, 64, 255] {
                let hash: Vec<u8> = (0..len).map(|i| (i * 37 + timestamp.len()) as u8).collect();
                let header = format_signature_header(timestamp, &hash);

                let parsed = parse_signature_header(&header);
                assert_eq!(parsed.timestamp, timestamp, "header {header}");
                assert_eq!(parsed.hash, hash, "header {header}");
                assert_eq!(format_signature_header(parsed.timestamp, &parsed.hash), header);
            }
        }
    }

    #[test]
    fn test_invalid_key_hex() {
        assert!(matches!(
            WebhookKey::from_hex("not-hex"),
            Err(SignatureError::InvalidKey(_))
        ));
        assert!(WebhookKey::from_hex("abc").is_err());
    }

    #[test]
    fn test_verify_reference_vector() {
        let key = WebhookKey::from_hex(KEY_HEX).unwrap();
        let expected = reference_hmac(BODY.as_bytes());

        assert!(key.verify(TIMESTAMP, BODY.as_bytes(), &expected));

        let mut tampered = BODY.as_bytes().to_vec();
        tampered[5] ^= 0x01;
        assert!(!key.verify(TIMESTAMP, &tampered, &expected));

        assert!(!key.verify("1559303131512", BODY.as_bytes(), &expected));
    }

    #[test]
    fn test_verify_rejects_wrong_hash_of_same_length() {
        let key = WebhookKey::from_hex(KEY_HEX).unwrap();
        let expected = reference_hmac(BODY.as_bytes());

        for idx in [0, 15, 31] {
            let mut wrong = expected.clone();
            wrong[idx] = wrong[idx].wrapping_add(1);
            assert!(!key.verify(TIMESTAMP, BODY.as_bytes(), &wrong));
        }
    }

    #[test]
    fn test_verify_rejects_length_mismatch() {
        let key = WebhookKey::from_hex(KEY_HEX).unwrap();
        let expected = reference_hmac(BODY.as_bytes());

        assert!(!key.verify(TIMESTAMP, BODY.as_bytes(), &expected[..31]));
        assert!(!key.verify(TIMESTAMP, BODY.as_bytes(), &[]));

        let mut longer = expected.clone();
        longer.push(0);
        assert!(!key.verify(TIMESTAMP, BODY.as_bytes(), &longer));
    }

    #[test]
    fn test_accumulator_matches_one_shot() {
        let key = WebhookKey::from_hex(KEY_HEX).unwrap();
        let expected = reference_hmac(BODY.as_bytes());

        let mut acc = key.accumulator(TIMESTAMP);
        for chunk in BODY.as_bytes().chunks(7) {
            acc.update(chunk);
        }
        assert!(acc.verify(&expected));
    }

    #[test]
    fn test_sign_produces_parseable_header() {
        let key = WebhookKey::from_hex(KEY_HEX).unwrap();
        let header = key.sign(TIMESTAMP, BODY.as_bytes());

        let parsed = parse_signature_header(&header);
        assert_eq!(parsed.timestamp, TIMESTAMP);
        assert_eq!(parsed.hash, reference_hmac(BODY.as_bytes()));
    }
}
