/// Signature checks for transactions
use crate::crypto::{Secp256k1Verifier, SignatureVerifier};
use crate::transaction::types::Transaction;

impl Transaction {
    /// Checks the signature with the default secp256k1 verifier.
    pub fn verify(&self) -> bool {
        self.verify_with(&Secp256k1Verifier)
    }

    /// Issuance transactions are trusted by construction. Everything else
    /// needs a signature over the signable message that `verifier` accepts;
    /// a missing signature is a failure, never an error.
    pub fn verify_with<V: SignatureVerifier + ?Sized>(&self, verifier: &V) -> bool {
        let sender = match &self.sender {
            Some(sender) => sender,
            None => return true,
        };
        match &self.signature {
            Some(signature) => verifier.verify(sender, &self.signable_message(), signature),
            None => false,
        }
    }
}
