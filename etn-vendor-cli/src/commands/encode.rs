//! Payment string and QR code commands

use anyhow::Result;
use etn_vendor::{PaymentEncoder, PaymentRequest, VendorCredentials};

use super::{build_client, parse_amount};
use crate::ui;

/// Convert a local price, then show the payment string and QR URL.
pub async fn create(
    credentials: VendorCredentials,
    amount: &str,
    currency: &str,
    outlet: &str,
    payment_id: Option<&str>,
    render: bool,
) -> Result<()> {
    ui::header("Create Payment");

    let amount = parse_amount(amount)?;
    let client = build_client(credentials)?;

    let spinner = ui::spinner("Fetching exchange rates...");
    let target = client
        .create_payment(amount, currency, outlet, payment_id)
        .await;
    spinner.finish_and_clear();
    let target = target?;

    ui::field("Price", format!("{} {}", amount, currency.to_uppercase()));
    show_request(&target.request, &target.qr_url, render)?;

    ui::separator();
    ui::info(&format!(
        "Poll for it with: etn-vendor poll --outlet {} --payment-id {} --watch",
        target.request.outlet(),
        target.request.payment_id()
    ));
    Ok(())
}

/// Encode an amount already in ETN. No network access.
pub fn offline(
    etn: &str,
    outlet: &str,
    payment_id: Option<&str>,
    render: bool,
    json: bool,
) -> Result<()> {
    let encoder = PaymentEncoder::new();
    let request = encoder.encode(parse_amount(etn)?, outlet, payment_id)?;
    let qr_url = encoder.qr().url_for(&request);

    if json {
        ui::json(&serde_json::json!({
            "payment_string": request.canonical(),
            "outlet": request.outlet().as_str(),
            "payment_id": request.payment_id().as_str(),
            "amount": request.amount().to_string(),
            "qr_url": qr_url,
        }));
        return Ok(());
    }

    ui::header("Payment Request");
    show_request(&request, &qr_url, render)
}

fn show_request(request: &PaymentRequest, qr_url: &str, render: bool) -> Result<()> {
    ui::payment_request(request, qr_url);
    if render {
        ui::qr_code(&request.canonical())?;
        ui::info("Scan with the Electroneum app to pay");
    }
    Ok(())
}
