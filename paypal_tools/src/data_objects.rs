use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A money amount in PayPal's wire format. `value` is a decimal string, e.g. "2.45".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Money {
    pub currency_code: String,
    pub value: String,
}

impl Money {
    pub fn new<S: Into<String>, V: Into<String>>(currency_code: S, value: V) -> Self {
        Self { currency_code: currency_code.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PayPalPurchaseUnit {
    /// PayPal omits the reference id when the merchant did not set one.
    #[serde(default)]
    pub reference_id: String,
    pub amount: Money,
}

/// The parts of a PayPal order that matter for reconciliation. The full response body is kept in `raw`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PayPalOrder {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub purchase_units: Vec<PayPalPurchaseUnit>,
    #[serde(skip)]
    pub raw: String,
}

impl PayPalOrder {
    /// Parses an order from the body of a `GET /v2/checkout/orders/{id}` response, keeping the body verbatim.
    pub fn from_body(body: String) -> Result<Self, serde_json::Error> {
        let mut order = serde_json::from_str::<PayPalOrder>(&body)?;
        order.raw = body;
        Ok(order)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PayPalRefund {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Tokens are considered stale this long before PayPal actually expires them.
    pub const EXPIRY_MARGIN_SECS: i64 = 60;

    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self { token: response.access_token, expires_at: now + Duration::seconds(response.expires_in) }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(Self::EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ORDER: &str = r#"{
        "id": "5O190127TN364715T",
        "status": "COMPLETED",
        "intent": "CAPTURE",
        "purchase_units": [{
            "reference_id": "ref-1",
            "amount": { "currency_code": "USD", "value": "2.45" },
            "payments": { "captures": [{ "id": "3C679366HH908993F", "status": "COMPLETED" }] }
        }],
        "links": []
    }"#;

    #[test]
    fn order_keeps_raw_body() {
        let order = PayPalOrder::from_body(ORDER.to_string()).unwrap();
        assert_eq!(order.id, "5O190127TN364715T");
        assert_eq!(order.status, "COMPLETED");
        assert_eq!(order.purchase_units.len(), 1);
        assert_eq!(order.purchase_units[0].reference_id, "ref-1");
        assert_eq!(order.purchase_units[0].amount, Money::new("USD", "2.45"));
        assert_eq!(order.raw, ORDER);
    }

    #[test]
    fn order_without_units() {
        let order = PayPalOrder::from_body(r#"{"id": "X", "status": "CREATED"}"#.to_string()).unwrap();
        assert!(order.purchase_units.is_empty());
    }

    #[test]
    fn token_freshness() {
        let now = Utc::now();
        let token = AccessToken::from_response(TokenResponse { access_token: "A21A".into(), expires_in: 3600 }, now);
        assert!(token.is_fresh(now));
        assert!(token.is_fresh(now + Duration::seconds(3539)));
        assert!(!token.is_fresh(now + Duration::seconds(3540)));
        let short = AccessToken::from_response(TokenResponse { access_token: "A21A".into(), expires_in: 30 }, now);
        assert!(!short.is_fresh(now));
    }
}
