//! Pluggable entry cryptography.
//!
//! The store does not bundle a cipher. Hosts that want encrypted entries
//! install an implementation of [`StateCipher`]; with none configured the
//! `encrypted` persist flag is honored silently as plaintext.

/// Transforms serialized entries before they reach disk and back.
///
/// `decrypt` must invert `encrypt` for the store to read back what it
/// wrote. Both operate on the serialized JSON text of an entry.
pub trait StateCipher: Send + Sync {
    /// Encrypt the serialized entry text.
    ///
    /// # Errors
    ///
    /// Implementations report their own failure conditions; a failing
    /// encrypt aborts the write.
    fn encrypt(&self, plaintext: &str) -> anyhow::Result<String>;

    /// Decrypt the on-disk text back into serialized entry JSON.
    ///
    /// # Errors
    ///
    /// A failing decrypt makes the store treat the entry as missing.
    fn decrypt(&self, ciphertext: &str) -> anyhow::Result<String>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::StateCipher;

    /// Reverses the text. Good enough to prove the plumbing round-trips.
    pub(crate) struct ReversingCipher;

    impl StateCipher for ReversingCipher {
        fn encrypt(&self, plaintext: &str) -> anyhow::Result<String> {
            Ok(plaintext.chars().rev().collect())
        }

        fn decrypt(&self, ciphertext: &str) -> anyhow::Result<String> {
            Ok(ciphertext.chars().rev().collect())
        }
    }

    /// Always fails, for exercising the error paths.
    pub(crate) struct FailingCipher;

    impl StateCipher for FailingCipher {
        fn encrypt(&self, _plaintext: &str) -> anyhow::Result<String> {
            anyhow::bail!("cipher unavailable")
        }

        fn decrypt(&self, _ciphertext: &str) -> anyhow::Result<String> {
            anyhow::bail!("cipher unavailable")
        }
    }
}
