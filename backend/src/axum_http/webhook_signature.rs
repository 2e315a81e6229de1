use anyhow::{Result, bail};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-payment-signature";

/// Maximum accepted distance between the signed timestamp and the local clock.
pub const TOLERANCE_SECS: u64 = 300;

/// Checks a `t=<unix seconds>,v1=<hex>` header against HMAC-SHA256 of `"<t>.<body>"`.
pub fn verify_signature(secret: &str, signature_header: &str, payload: &[u8], now: i64) -> Result<()> {
    let mut timestamp: Option<&str> = None;
    let mut signature: Option<&str> = None;

    for part in signature_header.split(',').map(str::trim) {
        if let Some(rest) = part.strip_prefix("t=") {
            timestamp = Some(rest);
        } else if let Some(rest) = part.strip_prefix("v1=") {
            signature = Some(rest);
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| anyhow::anyhow!("missing timestamp in payment signature"))?;
    let signature = signature.ok_or_else(|| anyhow::anyhow!("missing v1 in payment signature"))?;

    let signed_at: i64 = timestamp.parse()?;
    if now.abs_diff(signed_at) > TOLERANCE_SECS {
        bail!("payment signature timestamp is outside the tolerance window");
    }

    let provided = hex::decode(signature)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("invalid webhook secret: {}", e))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    if mac.verify_slice(&provided).is_err() {
        bail!("invalid payment signature");
    }

    Ok(())
}

pub fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("invalid webhook secret: {}", e))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    ))
}
