//! Terminal output for vendor commands
//!
//! Decorated output goes to stdout; warnings and errors go to stderr so that
//! `--json` and single-value commands stay pipeable.

use std::fmt::Display;
use std::time::Duration;

use colored::Colorize;
use console::Term;
use etn_vendor::{PaymentRequest, PollResult, WebhookNotification};
use indicatif::{ProgressBar, ProgressStyle};
use qrcode::render::unicode::Dense1x2;
use qrcode::QrCode;

/// Width of the label column in [`field`].
const LABEL_WIDTH: usize = 16;

pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

pub fn header(text: &str) {
    println!("\n{}", text.bold().underline());
}

/// Print an aligned `label  value` line.
pub fn field(label: &str, value: impl Display) {
    let label = format!("{:<width$}", label, width = LABEL_WIDTH);
    println!("  {} {}", label.cyan(), value);
}

/// Print a coin amount.
pub fn coins(label: &str, amount: impl Display) {
    field(label, format!("{} ETN", amount.to_string().bold()));
}

/// Print the parts of a payment request and where its QR image lives.
pub fn payment_request(request: &PaymentRequest, qr_url: &str) {
    coins("Amount", request.amount());
    field("Outlet", request.outlet());
    field("Payment ID", request.payment_id());
    field("Payment string", request.canonical().green());
    field("QR URL", qr_url);
}

/// Print the fields of a verified webhook.
pub fn notification(notification: &WebhookNotification) {
    if let Some(id) = &notification.payment_id {
        field("Payment ID", id);
    }
    if let Some(amount) = notification.amount {
        coins("Amount", amount);
    }
    match notification.timestamp_utc() {
        Some(at) => field("Timestamp", at.to_rfc3339()),
        None => field("Timestamp", notification.timestamp.to_string().dimmed()),
    }
}

/// One line per unanswered poll, stamped with local time.
pub fn poll_pending(attempt: u32) {
    let at = chrono::Local::now().format("%H:%M:%S");
    println!(
        "{} {} not paid yet (attempt {})",
        "…".yellow(),
        format!("[{}]", at).dimmed(),
        attempt
    );
}

pub fn payment_received(result: &PollResult) {
    success("Payment received");
    if let Some(amount) = result.amount {
        coins("Amount", amount);
    }
    if let Some(message) = &result.message {
        field("Message", message);
    }
}

/// Spinner shown while waiting on the network.
///
/// Hidden when stdout is not a terminal so piped output stays clean.
pub fn spinner(message: &str) -> ProgressBar {
    if !Term::stdout().is_term() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Render a payment string as a scannable QR code.
///
/// Uses half-block characters so two module rows fit in one text line. The
/// quiet zone is kept; wallet scanners fail without it.
pub fn qr_code(payment_string: &str) -> anyhow::Result<()> {
    let code = QrCode::new(payment_string.as_bytes())?;
    let image = code
        .render::<Dense1x2>()
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .build();

    println!("\n{}\n", image);
    Ok(())
}

pub fn separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// Print a JSON document without decoration.
pub fn json(value: &serde_json::Value) {
    if let Ok(pretty) = serde_json::to_string_pretty(value) {
        println!("{}", pretty);
    }
}
