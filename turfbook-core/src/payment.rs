use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Identifiers the gateway hands back on a successful payment. The
/// signature is a hex HMAC-SHA256 over `"{order_id}|{payment_id}"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentProof {
    pub payment_id: String,
    pub order_id: String,
    pub signature: String,
}

/// Everything the gateway widget is invoked with: amount in minor
/// currency units, plus display and prefill data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCheckout {
    pub amount_minor: i64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub prefill: GatewayPrefill,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPrefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Result of one gateway attempt. Dismissal is not an error: the
/// session stays retryable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    Completed(PaymentProof),
    Dismissed,
}

/// Seam to the external payment processor. The gateway is outside the
/// trust boundary; nothing it returns is believed until the signature
/// has been verified server-side.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn collect(
        &self,
        checkout: &GatewayCheckout,
    ) -> Result<GatewayOutcome, Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("Invalid payment signature")]
    Mismatch,
    #[error("Malformed signature encoding")]
    MalformedSignature,
    #[error("HMAC key error")]
    KeyError,
}

/// Compute the hex signature the gateway produces for a payment. Used by
/// the mock gateway and by tests with a known secret.
pub fn sign_payment(order_id: &str, payment_id: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a gateway payment proof against the server-held secret.
/// Comparison runs in constant time via `Mac::verify_slice`.
pub fn verify_payment_signature(proof: &PaymentProof, secret: &str) -> Result<(), SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::KeyError)?;
    mac.update(format!("{}|{}", proof.order_id, proof.payment_id).as_bytes());

    let sig_bytes =
        hex::decode(&proof.signature).map_err(|_| SignatureError::MalformedSignature)?;
    mac.verify_slice(&sig_bytes).map_err(|_| {
        tracing::warn!(order_id = %proof.order_id, "Payment signature mismatch");
        SignatureError::Mismatch
    })?;

    Ok(())
}
