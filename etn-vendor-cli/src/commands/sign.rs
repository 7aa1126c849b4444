//! Payload signing and webhook verification

use anyhow::{bail, Result};
use etn_vendor::{VendorCredentials, VendorError, WebhookNotification};

use super::{build_client, read_payload};
use crate::ui;

/// Print the signature of a payload.
pub fn sign(credentials: VendorCredentials, payload: &str) -> Result<()> {
    let body = read_payload(payload)?;
    let client = build_client(credentials)?;
    println!("{}", client.generate_signature(&body)?);
    Ok(())
}

/// Check a webhook payload the way a listener would.
///
/// Exits with an error when the payload would be answered with 401.
pub fn verify(credentials: VendorCredentials, payload: &str, signature: &str) -> Result<()> {
    let body = read_payload(payload)?;
    let client = build_client(credentials)?;

    let verdict = match client.check_signature(&body, signature) {
        Ok(verdict) => verdict,
        Err(VendorError::MissingCredentials(what)) => {
            bail!(
                "Missing {}; pass --api-key/--api-secret or set ETN_VENDOR_API_KEY/ETN_VENDOR_API_SECRET",
                what
            )
        }
        Err(e) => return Err(e.into()),
    };

    if !verdict.is_valid() {
        ui::error(&format!("Signature rejected: {}", verdict));
        bail!("webhook would be answered with HTTP 401");
    }

    ui::success("Signature valid, webhook would be answered with HTTP 200");
    ui::notification(&WebhookNotification::from_slice(&body)?);
    Ok(())
}
