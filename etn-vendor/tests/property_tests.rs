//! Property-based tests for etn-vendor
//!
//! These tests use proptest to verify invariants across a wide range of inputs.

#[cfg(test)]
mod encoding_properties {
    use etn_vendor::{PaymentEncoder, QrUrlBuilder};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    proptest! {
        /// The canonical string is prefix, outlet, id and a 2dp amount.
        #[test]
        fn canonical_format(
            outlet in "[0-9a-f]{1,24}",
            id in "[0-9a-f]{10}",
            cents in 1i64..100_000_000_000i64
        ) {
            let amount = Decimal::new(cents, 2);
            let request = PaymentEncoder::new().encode(amount, &outlet, Some(&id)).unwrap();

            let expected = format!("etn-it-{}/{}/{}.{:02}", outlet, id, cents / 100, cents % 100);
            prop_assert_eq!(request.canonical(), expected);
        }

        /// Encoding with an explicit id is a pure function of its inputs.
        #[test]
        fn encode_is_pure(
            outlet in "[0-9a-fA-F]{1,24}",
            id in "[0-9a-fA-F]{10}",
            mantissa in 1i64..10_000_000_000i64,
            scale in 0u32..6
        ) {
            let amount = Decimal::new(mantissa, scale);
            let encoder = PaymentEncoder::new();
            let first = encoder.encode(amount, &outlet, Some(&id));
            let second = encoder.encode(amount, &outlet, Some(&id));

            match (first, second) {
                (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
                (Err(a), Err(b)) => prop_assert_eq!(a.code(), b.code()),
                _ => prop_assert!(false, "outcomes differ"),
            }
        }

        /// The amount always carries exactly two decimals, rounded half away from zero.
        #[test]
        fn amount_has_two_decimals(mantissa in 1i64..10_000_000_000i64, scale in 0u32..6) {
            let amount = Decimal::new(mantissa, scale);
            if let Ok(request) = PaymentEncoder::new().encode(amount, "0abc", Some("7ce25b4dc0")) {
                let rendered = request.amount().to_string();
                let (_, fraction) = rendered.split_once('.').unwrap();
                prop_assert_eq!(fraction.len(), 2);

                let diff = (request.amount().as_decimal() - amount).abs();
                prop_assert!(diff <= Decimal::new(5, 3));
            }
        }

        /// The QR URL carries the canonical string, percent-encoded.
        #[test]
        fn qr_url_decodes_to_canonical(
            outlet in "[0-9a-f]{1,24}",
            id in "[0-9a-f]{10}",
            cents in 1i64..1_000_000_000i64
        ) {
            let request = PaymentEncoder::new()
                .encode(Decimal::new(cents, 2), &outlet, Some(&id))
                .unwrap();
            let url = QrUrlBuilder::default().url_for(&request);

            let (_, data) = url.split_once("data=").unwrap();
            prop_assert!(!data.contains('/'));
            prop_assert_eq!(urlencoding::decode(data).unwrap(), request.canonical());
        }

        /// Anything that is not plain hex is rejected as an outlet.
        #[test]
        fn non_hex_outlet_rejected(outlet in "[0-9a-f]{0,8}[g-zG-Z_/ ][0-9a-f]{0,8}") {
            let result = PaymentEncoder::new().encode(Decimal::ONE, &outlet, Some("7ce25b4dc0"));
            prop_assert!(matches!(result, Err(etn_vendor::VendorError::InvalidOutlet(_))));
        }
    }
}

#[cfg(test)]
mod payment_id_properties {
    use etn_vendor::PaymentId;
    use proptest::prelude::*;

    proptest! {
        /// Ids built from entropy are 10 lowercase hex characters.
        #[test]
        fn id_from_bytes_well_formed(bytes in any::<[u8; 5]>()) {
            let id = PaymentId::from_bytes(bytes);
            prop_assert_eq!(id.as_str().len(), 10);
            prop_assert!(id
                .as_str()
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
        }

        /// Ids of the wrong length are rejected.
        #[test]
        fn wrong_length_rejected(id in "[0-9a-f]{0,9}|[0-9a-f]{11,20}") {
            prop_assert!(PaymentId::parse(&id).is_err());
        }
    }
}

#[cfg(test)]
mod conversion_properties {
    use etn_vendor::{CurrencyConverter, RateTable};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    proptest! {
        /// The converted amount is the exact quotient rounded to two places.
        #[test]
        fn conversion_within_rounding(
            cents in 1i64..100_000_000i64,
            rate_micros in 1i64..10_000_000i64
        ) {
            let value = Decimal::new(cents, 2);
            let rate = Decimal::new(rate_micros, 6);
            let rates = RateTable::from_entries([("price_usd", json!(rate.to_string()))]);

            if let Ok(coins) = CurrencyConverter::convert(value, "usd", &rates) {
                let diff = (coins.as_decimal() - value / rate).abs();
                prop_assert!(diff <= Decimal::new(5, 3));
            }
        }

        /// Non-positive rates never convert.
        #[test]
        fn non_positive_rate_rejected(rate in -1_000_000i64..=0i64) {
            let rates = RateTable::from_entries([("price_usd", json!(rate))]);
            let result = CurrencyConverter::convert(Decimal::ONE, "USD", &rates);
            prop_assert!(
                matches!(result, Err(etn_vendor::VendorError::InvalidRate { .. })),
                "unexpected result: {:?}",
                result
            );
        }
    }
}

#[cfg(test)]
mod signature_properties {
    use etn_vendor::SignatureService;
    use proptest::prelude::*;
    use serde_json::json;

    const KEY: &str = "key_live_proptest";

    proptest! {
        /// A freshly signed payload verifies.
        #[test]
        fn sign_then_verify(secret in "[ -~]{1,64}", note in "[ -~]{0,64}") {
            let service = SignatureService::new();
            let body = json!({
                "key": KEY,
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "note": note,
            });
            let signed = service.sign_value(&body, &secret).unwrap();
            prop_assert!(service.verify(&signed.body, &signed.signature, KEY, &secret).unwrap());
        }

        /// A different secret never verifies.
        #[test]
        fn wrong_secret_rejected(secret in "[a-z]{8,32}", other in "[A-Z]{8,32}") {
            let service = SignatureService::new();
            let body = json!({"key": KEY, "timestamp": chrono::Utc::now().timestamp()});
            let signed = service.sign_value(&body, &secret).unwrap();
            prop_assert!(!service.verify(&signed.body, &signed.signature, KEY, &other).unwrap());
        }
    }
}
