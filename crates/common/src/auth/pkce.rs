//! PKCE (Proof Key for Code Exchange) for OAuth 2.1
//!
//! Implements RFC 7636. The remote CRM platform requires the S256
//! challenge method; the plain method is not supported here.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a cryptographically secure code verifier
///
/// 32 random bytes, base64url-encoded without padding, yielding 43
/// characters — inside the 43–128 character band RFC 7636 mandates.
///
/// # Errors
/// Returns error if random number generation fails (extremely rare)
pub fn generate_code_verifier() -> Result<String, String> {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    Ok(URL_SAFE_NO_PAD.encode(random_bytes))
}

/// Derive the code challenge from a verifier
///
/// Per RFC 7636: BASE64URL(SHA256(ASCII(code_verifier))), no padding.
/// Deterministic — the same verifier always yields the same challenge.
///
/// # Errors
/// Returns error if encoding fails
pub fn generate_code_challenge(verifier: &str) -> Result<String, String> {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(hasher.finalize()))
}

/// Generate a random state token for CSRF protection
///
/// 32 random bytes (256 bits of entropy), base64url-encoded without
/// padding. Unique per authorization attempt.
///
/// # Errors
/// Returns error if random number generation fails (extremely rare)
pub fn generate_state() -> Result<String, String> {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    Ok(URL_SAFE_NO_PAD.encode(random_bytes))
}

/// Validate that the state received in the callback matches the one
/// sent in the authorization request.
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    expected == actual
}

/// One PKCE authorization attempt
///
/// Holds the verifier (secret until token exchange), the challenge
/// (sent in the authorization request), and the anti-CSRF state.
/// Created when the authorization URL is built and consumed exactly
/// once at exchange time.
#[derive(Debug, Clone)]
pub struct PKCEChallenge {
    /// Random string, kept secret until token exchange
    pub code_verifier: String,

    /// SHA-256 hash of `code_verifier`, base64url without padding
    pub code_challenge: String,

    /// Random CSRF protection token; must match exactly at exchange
    pub state: String,
}

impl PKCEChallenge {
    /// Generate a fresh verifier/challenge/state triple.
    ///
    /// # Errors
    /// Returns error if cryptographic random number generation fails
    /// (extremely rare)
    pub fn generate() -> Result<Self, String> {
        let code_verifier = generate_code_verifier()?;
        let code_challenge = generate_code_challenge(&code_verifier)?;
        let state = generate_state()?;

        Ok(Self { code_verifier, code_challenge, state })
    }

    /// Challenge method sent to the authorization endpoint.
    #[must_use]
    pub fn challenge_method(&self) -> &str {
        "S256"
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::pkce.
    use super::*;

    #[test]
    fn test_verifier_length_within_rfc_band() {
        let challenge = PKCEChallenge::generate().expect("generate failed");
        assert!(
            challenge.code_verifier.len() >= 43,
            "verifier too short: {} chars",
            challenge.code_verifier.len()
        );
        assert!(
            challenge.code_verifier.len() <= 128,
            "verifier too long: {} chars",
            challenge.code_verifier.len()
        );
    }

    #[test]
    fn test_url_safe_alphabet_no_padding() {
        let challenge = PKCEChallenge::generate().expect("generate failed");

        for value in [&challenge.code_verifier, &challenge.code_challenge, &challenge.state] {
            assert!(value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
            assert!(!value.contains('='));
        }
    }

    #[test]
    fn test_challenge_is_deterministic_in_verifier() {
        let challenge = PKCEChallenge::generate().expect("generate failed");
        let recomputed =
            generate_code_challenge(&challenge.code_verifier).expect("recompute failed");
        assert_eq!(challenge.code_challenge, recomputed);

        // Known vector from RFC 7636 appendix B
        let rfc = generate_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk")
            .expect("rfc vector failed");
        assert_eq!(rfc, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    #[test]
    fn test_each_attempt_is_unique() {
        let a = PKCEChallenge::generate().expect("generate failed");
        let b = PKCEChallenge::generate().expect("generate failed");

        assert_ne!(a.code_verifier, b.code_verifier);
        assert_ne!(a.code_challenge, b.code_challenge);
        assert_ne!(a.state, b.state);
    }

    #[test]
    fn test_challenge_method_is_s256() {
        let challenge = PKCEChallenge::generate().expect("generate failed");
        assert_eq!(challenge.challenge_method(), "S256");
    }

    #[test]
    fn test_state_validation() {
        let state = generate_state().expect("state failed");
        assert!(validate_state(&state, &state));
        assert!(!validate_state(&state, "something-else"));
    }
}
