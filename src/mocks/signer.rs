//! Mock signer for testing.

use crate::error::SigningError;
use crate::signing::Signer;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Signature returned by [`MockSigner`].
pub const MOCK_SIGNATURE: &str = "mock-signature";

/// Signer returning a fixed signature and recording what it was asked to sign.
#[derive(Debug, Default)]
pub struct MockSigner {
    sign_count: AtomicUsize,
    strings_to_sign: Mutex<Vec<String>>,
}

impl MockSigner {
    /// Create a new mock signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sign calls.
    pub fn sign_count(&self) -> usize {
        self.sign_count.load(Ordering::SeqCst)
    }

    /// Every string passed to `sign`, in call order.
    pub fn strings_to_sign(&self) -> Vec<String> {
        self.strings_to_sign.lock().clone()
    }
}

impl Signer for MockSigner {
    fn name(&self) -> &'static str {
        "MOCK"
    }

    fn version(&self) -> &'static str {
        "1.0"
    }

    fn sign(&self, string_to_sign: &str, _secret: &str) -> Result<String, SigningError> {
        self.sign_count.fetch_add(1, Ordering::SeqCst);
        self.strings_to_sign.lock().push(string_to_sign.to_string());
        Ok(MOCK_SIGNATURE.to_string())
    }
}
