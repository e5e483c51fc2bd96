//! Payment callback signature verification.
//!
//! The gateway signs its redirect payload with HMAC-SHA256 over
//! `order_id + "|" + payment_id`, keyed by the server-held key secret, and
//! sends the hex digest. This check is the only defense against forged
//! payment confirmations; it runs server-side and the key never reaches a
//! client context.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the expected hex signature for a gateway callback.
#[must_use]
pub fn sign(secret: &[u8], order_id: &str, payment_id: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());

    hex::encode(mac.finalize().into_bytes())
}

/// Verify a claimed callback signature.
///
/// The claimed value is hex-decoded and compared against the recomputed MAC
/// in constant time. Anything that is not valid hex of the right length is
/// rejected outright.
#[must_use]
pub fn verify(secret: &[u8], order_id: &str, payment_id: &str, claimed: &str) -> bool {
    let Ok(claimed_bytes) = hex::decode(claimed) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());

    mac.verify_slice(&claimed_bytes).is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"8mK2nL5pQ7rT0uW4zC6xY9aB3dE1fG";

    #[test]
    fn test_correct_signature_accepted() {
        let sig = sign(SECRET, "order_abc123", "pay_def456");
        assert!(verify(SECRET, "order_abc123", "pay_def456", &sig));
    }

    #[test]
    fn test_any_tampered_byte_rejected() {
        let sig = sign(SECRET, "order_abc123", "pay_def456");

        for i in 0..sig.len() {
            let mut tampered = sig.clone().into_bytes();
            // Flip the hex digit at position i to a different one
            tampered[i] = if tampered[i] == b'0' { b'1' } else { b'0' };
            let tampered = String::from_utf8(tampered).unwrap();
            if tampered == sig {
                continue;
            }
            assert!(
                !verify(SECRET, "order_abc123", "pay_def456", &tampered),
                "tampered signature accepted at byte {i}"
            );
        }
    }

    #[test]
    fn test_swapped_ids_rejected() {
        let sig = sign(SECRET, "order_abc123", "pay_def456");
        assert!(!verify(SECRET, "pay_def456", "order_abc123", &sig));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let sig = sign(SECRET, "order_abc123", "pay_def456");
        assert!(!verify(b"other-key", "order_abc123", "pay_def456", &sig));
    }

    #[test]
    fn test_non_hex_claim_rejected() {
        assert!(!verify(SECRET, "order_abc123", "pay_def456", "not-hex!"));
        assert!(!verify(SECRET, "order_abc123", "pay_def456", ""));
    }
}
