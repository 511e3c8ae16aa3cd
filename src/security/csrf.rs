//! CSRF token module
//!
//! Double-submit scheme: an opaque secret lives in the `_csrf` cookie, and
//! tokens handed to clients are `{salt}-{mac}` where the mac is an
//! HMAC-SHA256 over the salt and the cookie secret, keyed by the server-side
//! CSRF key. A token proves the sender can read the cookie; the server keeps
//! no per-session state.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SECRET_BYTES: usize = 18;
const SALT_BYTES: usize = 8;

/// Stateless CSRF token signer/verifier
pub struct CsrfSigner {
    key: Vec<u8>,
}

impl CsrfSigner {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.as_bytes().to_vec(),
        }
    }

    /// Generate a fresh cookie secret (base64url, no padding)
    pub fn generate_secret() -> String {
        let mut bytes = [0u8; SECRET_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Issue a token bound to the given cookie secret
    ///
    /// Each call uses a fresh salt, so repeated issues for the same secret
    /// produce distinct but equally valid tokens. The `.` separator is
    /// outside the base64url alphabet, so splitting on it is unambiguous.
    pub fn issue(&self, secret: &str) -> String {
        let mut salt_bytes = [0u8; SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = URL_SAFE_NO_PAD.encode(salt_bytes);
        let mac = self.mac_for(&salt, secret);
        format!("{salt}.{mac}")
    }

    /// Verify a presented token against the cookie secret
    pub fn verify(&self, secret: &str, token: &str) -> bool {
        let Some((salt, presented_mac)) = token.split_once('.') else {
            return false;
        };
        let Ok(presented) = URL_SAFE_NO_PAD.decode(presented_mac) else {
            return false;
        };
        // verify_slice is constant-time
        self.keyed_mac(salt, secret).verify_slice(&presented).is_ok()
    }

    fn mac_for(&self, salt: &str, secret: &str) -> String {
        let digest = self.keyed_mac(salt, secret).finalize().into_bytes();
        URL_SAFE_NO_PAD.encode(digest)
    }

    fn keyed_mac(&self, salt: &str, secret: &str) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(salt.as_bytes());
        mac.update(b".");
        mac.update(secret.as_bytes());
        mac
    }
}
