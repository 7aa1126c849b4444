//! Payment confirmation polling

use std::time::Duration;

use anyhow::{bail, Result};
use etn_vendor::{OutletId, PaymentId, PollRequest, VendorCredentials};

use super::build_client;
use crate::ui;

/// How `poll` repeats.
#[derive(Clone, Copy, Debug)]
pub struct PollOptions {
    pub watch: bool,
    pub interval_ms: u64,
    /// 0 means unlimited.
    pub max_attempts: u32,
}

/// Poll once, or until the payment arrives when watching.
pub async fn run(
    credentials: VendorCredentials,
    outlet: &str,
    payment_id: &str,
    options: PollOptions,
) -> Result<()> {
    ui::header("Payment Status");

    let request = PollRequest::new(&OutletId::parse(outlet)?, &PaymentId::parse(payment_id)?);
    let body = request.to_vec()?;
    let client = build_client(credentials)?;

    ui::field("Vendor address", &request.vendor_address);
    ui::field("Payment ID", &request.payment_id);

    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let spinner = ui::spinner("Waiting for payment...");
        let outcome = client.confirm_payment(&body, None).await;
        spinner.finish_and_clear();

        match outcome {
            Ok(result) if result.is_paid() => {
                ui::payment_received(&result);
                return Ok(());
            }
            Ok(result) if result.is_pending() => {
                ui::poll_pending(attempt);
                if !options.watch {
                    return Ok(());
                }
            }
            Ok(result) => {
                bail!(
                    "Poll endpoint returned status {}: {}",
                    result.status,
                    result.message.as_deref().unwrap_or("no message")
                );
            }
            Err(e) if options.watch && e.is_retryable() => {
                ui::warning(&format!("Poll failed, retrying: {}", e));
            }
            Err(e) => return Err(e.into()),
        }

        if options.max_attempts != 0 && attempt >= options.max_attempts {
            bail!("Payment not received after {} polls", attempt);
        }
        tokio::time::sleep(Duration::from_millis(options.interval_ms)).await;
    }
}
