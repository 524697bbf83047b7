use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::net::IpAddr;

/// `balance` result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Balance {
    pub balance: Decimal,
}

/// `rates` result: currency code -> rate, per direction
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Rates {
    #[serde(default)]
    pub deposit: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub withdraw: BTreeMap<String, Decimal>,
}

/// `commissions` result keyed by payment method
///
/// The provider varies the per-method layout, so entries stay as raw JSON.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Commissions {
    pub methods: BTreeMap<String, Value>,
}

impl Commissions {
    pub fn get(&self, method: &str) -> Option<&Value> {
        self.methods.get(method)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Waiting,
    Refund,
    Canceled,
    Expired,
    Error,
    #[serde(other)]
    Unknown,
}

/// One entry of the `payments` result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Payment {
    #[serde(deserialize_with = "lenient::string")]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub pay_id: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub method: String,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub profit: Option<Decimal>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub pay_date: Option<String>,
}

/// `payments` result
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaymentList {
    #[serde(default, deserialize_with = "lenient::count")]
    pub total: u64,
    /// Keyed by provider transaction id
    #[serde(default)]
    pub payments: BTreeMap<String, Payment>,
}

/// Optional filters for `payments`
///
/// None of these take part in the request signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentsFilter {
    pub trans_id: Option<String>,
    pub pay_id: Option<String>,
    pub offset: Option<u64>,
}

impl PaymentsFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trans_id(mut self, trans_id: impl Into<String>) -> Self {
        self.trans_id = Some(trans_id.into());
        self
    }

    pub fn pay_id(mut self, pay_id: impl Into<String>) -> Self {
        self.pay_id = Some(pay_id.into());
        self
    }

    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// `ip-notification` result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IpNotification {
    /// Comma separated list as sent by the provider
    pub ip: String,
}

impl IpNotification {
    /// Parsed notification source addresses; malformed entries are skipped
    pub fn addresses(&self) -> Vec<IpAddr> {
        self.ip
            .split(',')
            .filter_map(|entry| entry.trim().parse().ok())
            .collect()
    }
}

/// Who pays the payout commission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionType {
    Payment,
    Balance,
}

impl CommissionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Balance => "balance",
        }
    }
}

/// Parameters for `create-payout`
///
/// Only `payout_id`, `payout_type`, `amount` and `wallet` are signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutRequest {
    pub payout_id: String,
    pub payout_type: String,
    pub amount: Decimal,
    pub wallet: String,
    pub wallet_currency: Option<String>,
    pub commission_type: Option<CommissionType>,
    pub status_url: Option<String>,
}

impl PayoutRequest {
    pub fn new(
        payout_id: impl Into<String>,
        payout_type: impl Into<String>,
        amount: Decimal,
        wallet: impl Into<String>,
    ) -> Self {
        Self {
            payout_id: payout_id.into(),
            payout_type: payout_type.into(),
            amount,
            wallet: wallet.into(),
            wallet_currency: None,
            commission_type: None,
            status_url: None,
        }
    }

    pub fn wallet_currency(mut self, currency: impl Into<String>) -> Self {
        self.wallet_currency = Some(currency.into());
        self
    }

    pub const fn commission_type(mut self, commission_type: CommissionType) -> Self {
        self.commission_type = Some(commission_type);
        self
    }

    pub fn status_url(mut self, url: impl Into<String>) -> Self {
        self.status_url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Paid,
    InProcess,
    Canceled,
    Blocked,
    #[serde(other)]
    Unknown,
}

/// `create-payout` result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PayoutResult {
    #[serde(deserialize_with = "lenient::string")]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub payout_id: String,
    #[serde(default)]
    pub payout_type: String,
    pub status: PayoutStatus,
    pub amount: Decimal,
    #[serde(default)]
    pub commission: Option<Decimal>,
    #[serde(default)]
    pub commission_type: Option<String>,
    #[serde(default)]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub wallet: String,
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub complete_date: Option<String>,
}

// Identifiers and counters arrive as either JSON strings or numbers
mod lenient {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Value;

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(value) => Ok(value),
            Value::Number(value) => Ok(value.to_string()),
            Value::Null => Ok(String::new()),
            other => Err(D::Error::custom(format!(
                "expected string or number, got {}",
                other
            ))),
        }
    }

    pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(value) => value
                .as_u64()
                .ok_or_else(|| D::Error::custom(format!("invalid count: {}", value))),
            Value::String(value) => value
                .trim()
                .parse()
                .map_err(|e| D::Error::custom(format!("invalid count '{}': {}", value, e))),
            Value::Null => Ok(0),
            other => Err(D::Error::custom(format!("expected a count, got {}", other))),
        }
    }
}
