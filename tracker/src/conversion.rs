//! Conversion-parameter resolution.
//!
//! Every e-commerce event resolves to a [`Conversion`] record, whatever
//! the payload looks like. There is no allow-list of recognized event
//! names; an event that matches nothing still reports with the generic
//! fallback type.
//!
//! Resolution order per field, first present candidate wins:
//!
//! | field           | candidates                                                        |
//! |-----------------|-------------------------------------------------------------------|
//! | conversion type | root `conversionType`, root `conversion_type`, sub `conversionType`, root `name`, `"conv"` |
//! | revenue         | sub `total`/`value`/`revenue`, root `total`/`value`/`revenue`, `0` |
//! | currency        | sub `currency`, root `currency`, `"USD"`                          |
//! | order id        | sub then root `checkout_id`/`order_id`/`transaction_id`, `""`     |
//! | promo code      | sub `coupon`, root `coupon`, omitted                              |
//!
//! "sub" is the nested `ecommerce` record, or the root itself for flat
//! payloads (see [`crate::payload`]).

use crate::payload::Payload;

/// Fallback conversion type when the payload names none.
pub const DEFAULT_CONVERSION_TYPE: &str = "conv";

/// Fallback currency code.
pub const DEFAULT_CURRENCY: &str = "USD";

const REVENUE_KEYS: &[&str] = &["total", "value", "revenue"];
const ORDER_ID_KEYS: &[&str] = &["checkout_id", "order_id", "transaction_id"];

/// Normalized conversion parameters for one e-commerce event.
///
/// Every field resolves for every payload. Only the promo code is
/// genuinely optional; when absent it is omitted from the outbound
/// request rather than sent empty.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    pub conversion_type: String,
    /// Revenue in its transport representation. Defaults to `"0"`.
    pub revenue: String,
    pub currency: String,
    /// May be empty when the payload carries no order reference.
    pub order_id: String,
    pub promo_code: Option<String>,
}

/// Resolve the conversion record for an e-commerce payload.
pub fn resolve(payload: &Payload) -> Conversion {
    let root = payload.root();
    let sub = payload.ecommerce();

    let conversion_type = root
        .field("conversionType")
        .or_else(|| root.field("conversion_type"))
        .or_else(|| sub.field("conversionType"))
        .or_else(|| root.field("name"))
        .unwrap_or_else(|| DEFAULT_CONVERSION_TYPE.to_string());

    let revenue = sub
        .first(REVENUE_KEYS)
        .or_else(|| root.first(REVENUE_KEYS))
        .unwrap_or_else(|| "0".to_string());

    let currency = sub
        .field("currency")
        .or_else(|| root.field("currency"))
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    let order_id = sub
        .first(ORDER_ID_KEYS)
        .or_else(|| root.first(ORDER_ID_KEYS))
        .unwrap_or_default();

    let promo_code = sub.field("coupon").or_else(|| root.field("coupon"));

    Conversion {
        conversion_type,
        revenue,
        currency,
        order_id,
        promo_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve_json(value: serde_json::Value) -> Conversion {
        resolve(&Payload::new(value))
    }

    #[test]
    fn test_empty_payload_resolves_to_defaults() {
        let conversion = resolve_json(json!({}));

        assert_eq!(
            conversion,
            Conversion {
                conversion_type: "conv".to_string(),
                revenue: "0".to_string(),
                currency: "USD".to_string(),
                order_id: String::new(),
                promo_code: None,
            }
        );
    }

    #[test]
    fn test_root_conversion_type_wins_over_nested() {
        let conversion = resolve_json(json!({
            "conversionType": "root_type",
            "ecommerce": {"conversionType": "nested_type"},
        }));
        assert_eq!(conversion.conversion_type, "root_type");
    }

    #[test]
    fn test_snake_case_conversion_type_beats_nested() {
        let conversion = resolve_json(json!({
            "conversion_type": "snake",
            "ecommerce": {"conversionType": "nested_type"},
        }));
        assert_eq!(conversion.conversion_type, "snake");
    }

    #[test]
    fn test_event_name_used_when_no_explicit_type() {
        let conversion = resolve_json(json!({"name": "Order Completed"}));
        assert_eq!(conversion.conversion_type, "Order Completed");
    }

    #[test]
    fn test_nested_revenue_wins_over_root() {
        let conversion = resolve_json(json!({
            "ecommerce": {"value": 10},
            "total": 20,
        }));
        assert_eq!(conversion.revenue, "10");
    }

    #[test]
    fn test_revenue_candidate_order_within_section() {
        let conversion = resolve_json(json!({
            "ecommerce": {"value": 15.5, "revenue": 99},
        }));
        assert_eq!(conversion.revenue, "15.5");
    }

    #[test]
    fn test_zero_revenue_falls_through() {
        // A literal zero is indistinguishable from "not set" upstream
        let conversion = resolve_json(json!({
            "ecommerce": {"total": 0},
            "revenue": 42,
        }));
        assert_eq!(conversion.revenue, "42");
    }

    #[test]
    fn test_string_revenue_passes_through() {
        let conversion = resolve_json(json!({"total": "19.99"}));
        assert_eq!(conversion.revenue, "19.99");
    }

    #[test]
    fn test_order_id_fallback_chain() {
        let conversion = resolve_json(json!({
            "ecommerce": {"order_id": "o-2"},
            "checkout_id": "c-1",
        }));
        // The nested section is exhausted before the root is consulted
        assert_eq!(conversion.order_id, "o-2");

        let conversion = resolve_json(json!({"transaction_id": "t-3"}));
        assert_eq!(conversion.order_id, "t-3");
    }

    #[test]
    fn test_promo_code_absent_stays_absent() {
        let conversion = resolve_json(json!({"coupon": ""}));
        assert_eq!(conversion.promo_code, None);
    }

    #[test]
    fn test_promo_code_from_nested_section() {
        let conversion = resolve_json(json!({
            "ecommerce": {"coupon": "SAVE10"},
            "coupon": "ROOT10",
        }));
        assert_eq!(conversion.promo_code, Some("SAVE10".to_string()));
    }

    #[test]
    fn test_currency_from_payload() {
        let conversion = resolve_json(json!({
            "ecommerce": {"currency": "EUR"},
            "currency": "GBP",
        }));
        assert_eq!(conversion.currency, "EUR");
    }

    #[test]
    fn test_flat_payload_resolves_all_fields() {
        let conversion = resolve_json(json!({
            "name": "Purchase",
            "total": 120,
            "currency": "EUR",
            "order_id": "ord-55",
            "coupon": "WELCOME",
        }));

        assert_eq!(
            conversion,
            Conversion {
                conversion_type: "Purchase".to_string(),
                revenue: "120".to_string(),
                currency: "EUR".to_string(),
                order_id: "ord-55".to_string(),
                promo_code: Some("WELCOME".to_string()),
            }
        );
    }
}
