/// Transaction types for minichain
use crate::crypto::{AccountId, Signer};
use crate::error::ChainError;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

/// Marker used in the signable message when a transaction has no sender.
pub const ABSENT_SENDER_MARKER: &str = "null";

/// A value transfer between two accounts.
///
/// A transaction without a sender is an issuance (genesis mint or mining
/// reward) and is never signature-checked.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub sender: Option<AccountId>,
    pub recipient: AccountId,
    pub amount: u64,
    #[serde(default, with = "serde_bytes")]
    pub signature: Option<Vec<u8>>,
}

impl Transaction {
    pub fn new(sender: AccountId, recipient: AccountId, amount: u64) -> Self {
        Transaction {
            sender: Some(sender),
            recipient,
            amount,
            signature: None,
        }
    }

    /// Creates a sender-less transaction minting `amount` to `recipient`.
    pub fn issuance(recipient: AccountId, amount: u64) -> Self {
        Transaction {
            sender: None,
            recipient,
            amount,
            signature: None,
        }
    }

    pub fn is_issuance(&self) -> bool {
        self.sender.is_none()
    }

    /// `sender‖recipient‖amount`, hex-encoded ids and a decimal amount.
    pub fn signable_message(&self) -> Vec<u8> {
        let sender = self
            .sender
            .as_ref()
            .map(AccountId::to_hex)
            .unwrap_or_else(|| ABSENT_SENDER_MARKER.to_string());
        format!("{}{}{}", sender, self.recipient.to_hex(), self.amount).into_bytes()
    }

    /// Signs the transaction with `signer`, replacing any previous signature.
    pub fn sign<S: Signer + ?Sized>(&mut self, signer: &S) -> Result<(), ChainError> {
        let signature = signer.sign(&self.signable_message())?;
        self.signature = Some(signature);
        Ok(())
    }

    /// Canonical form: sorted keys, lowercase hex ids, `null` for absent fields.
    ///
    /// This exact shape feeds the block hash and must stay byte-stable.
    pub fn to_canonical(&self) -> Value {
        json!({
            "amount": self.amount,
            "recipient": self.recipient.to_hex(),
            "sender": self.sender.as_ref().map(AccountId::to_hex),
            "signature": self.signature.as_ref().map(hex::encode),
        })
    }

    pub fn hash(&self) -> String {
        hex::encode(Sha256::digest(self.to_canonical().to_string().as_bytes()))
    }
}
