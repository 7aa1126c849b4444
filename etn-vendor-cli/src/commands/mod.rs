//! CLI command implementations

pub mod encode;
pub mod payment_id;
pub mod poll;
pub mod sign;

use std::io::Read;

use anyhow::Context;
use etn_vendor::{VendorClient, VendorConfig, VendorCredentials};

/// Build a client from `ETN_VENDOR_*` configuration and the given credentials.
pub fn build_client(credentials: VendorCredentials) -> anyhow::Result<VendorClient> {
    let config = VendorConfig::from_env().context("Invalid ETN_VENDOR_* configuration")?;
    tracing::debug!(poll_url = %config.poll_url, rates_url = %config.rates_url, "using endpoints");
    Ok(VendorClient::with_config(credentials, config)?)
}

/// Read a payload argument: `@path` reads a file, `-` reads stdin, anything
/// else is the payload itself.
///
/// File and stdin contents are used byte for byte, since signatures cover
/// the exact bytes.
pub fn read_payload(arg: &str) -> anyhow::Result<Vec<u8>> {
    if arg == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read payload from stdin")?;
        return Ok(buf);
    }
    if let Some(path) = arg.strip_prefix('@') {
        return std::fs::read(path).with_context(|| format!("Failed to read payload from {}", path));
    }
    Ok(arg.as_bytes().to_vec())
}

/// Parse a decimal amount argument.
pub fn parse_amount(raw: &str) -> anyhow::Result<rust_decimal::Decimal> {
    let raw = raw.trim();
    raw.parse::<rust_decimal::Decimal>()
        .or_else(|_| rust_decimal::Decimal::from_scientific(raw))
        .with_context(|| format!("'{}' is not a number", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_payload_literal() {
        assert_eq!(read_payload(r#"{"a":1}"#).unwrap(), br#"{"a":1}"#);
    }

    #[test]
    fn test_read_payload_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        std::fs::write(&path, b"{\"a\":1}\n").unwrap();

        let payload = read_payload(&format!("@{}", path.display())).unwrap();
        assert_eq!(payload, b"{\"a\":1}\n");
    }

    #[test]
    fn test_read_payload_missing_file() {
        assert!(read_payload("@/definitely/not/here.json").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 12.3 ").unwrap().to_string(), "12.3");
        assert_eq!(parse_amount("1.5e2").unwrap(), rust_decimal::Decimal::from(150));
        assert!(parse_amount("twelve").is_err());
    }
}
