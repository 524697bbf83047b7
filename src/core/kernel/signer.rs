use crate::core::errors::AnyPayError;
use md5::Md5;
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};

/// Digest applied to the concatenated signing string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Md5,
}

impl DigestAlgorithm {
    /// Lowercase hex digest of `input`
    pub fn hex_digest(self, input: &str) -> String {
        match self {
            Self::Sha256 => hex::encode(Sha256::digest(input.as_bytes())),
            Self::Md5 => hex::encode(Md5::digest(input.as_bytes())),
        }
    }
}

/// A single slot in a signing string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureField {
    MethodName,
    ApiId,
    ApiKey,
    SecretKey,
    ProjectId,
    PayoutId,
    PayoutType,
    Amount,
    Wallet,
    Currency,
    MerchantId,
    PayId,
}

/// Every operation the provider authenticates with a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignedMethod {
    Balance,
    Rates,
    Commissions,
    Payments,
    IpNotification,
    CreatePayout,
    /// Merchant payment link; signed locally, never sent to the API
    MerchantLink,
}

impl SignedMethod {
    pub const ALL: [Self; 7] = [
        Self::Balance,
        Self::Rates,
        Self::Commissions,
        Self::Payments,
        Self::IpNotification,
        Self::CreatePayout,
        Self::MerchantLink,
    ];

    /// Remote method name, also the first token of API signing strings
    pub const fn name(self) -> &'static str {
        match self {
            Self::Balance => "balance",
            Self::Rates => "rates",
            Self::Commissions => "commissions",
            Self::Payments => "payments",
            Self::IpNotification => "ip-notification",
            Self::CreatePayout => "create-payout",
            Self::MerchantLink => "merchant-link",
        }
    }

    /// Fields in the exact order the provider concatenates them
    pub const fn fields(self) -> &'static [SignatureField] {
        use SignatureField::{
            Amount, ApiId, ApiKey, Currency, MerchantId, MethodName, PayId, PayoutId, PayoutType,
            ProjectId, SecretKey, Wallet,
        };

        match self {
            Self::Balance | Self::Rates | Self::IpNotification => &[MethodName, ApiId, ApiKey],
            Self::Commissions | Self::Payments => &[MethodName, ApiId, ProjectId, ApiKey],
            Self::CreatePayout => &[
                MethodName, ApiId, PayoutId, PayoutType, Amount, Wallet, ApiKey,
            ],
            Self::MerchantLink => &[Currency, Amount, SecretKey, MerchantId, PayId],
        }
    }

    pub const fn separator(self) -> &'static str {
        match self {
            Self::MerchantLink => ":",
            _ => "",
        }
    }

    pub const fn algorithm(self) -> DigestAlgorithm {
        match self {
            Self::MerchantLink => DigestAlgorithm::Md5,
            _ => DigestAlgorithm::Sha256,
        }
    }
}

/// Join already-ordered values and digest them.
pub fn build_signature(values: &[&str], separator: &str, algorithm: DigestAlgorithm) -> String {
    algorithm.hex_digest(&values.join(separator))
}

/// Business values supplied by the caller for one signing operation
///
/// Credentials and the method name are filled in by the signer.
#[derive(Debug, Default, Clone)]
pub struct SignatureFields<'a> {
    values: Vec<(SignatureField, &'a str)>,
}

impl<'a> SignatureFields<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: SignatureField, value: &'a str) -> Self {
        self.values.retain(|(existing, _)| *existing != field);
        self.values.push((field, value));
        self
    }

    pub fn get(&self, field: SignatureField) -> Option<&'a str> {
        self.values
            .iter()
            .find(|(existing, _)| *existing == field)
            .map(|(_, value)| *value)
    }
}

/// Signer trait for request authentication
pub trait Signer: Send + Sync {
    /// Produce the signature for `method` over the provider's field order
    fn sign(&self, method: SignedMethod, fields: &SignatureFields<'_>)
        -> Result<String, AnyPayError>;
}

/// Signer holding the account credentials
pub struct AnyPaySigner {
    api_id: String,
    api_key: Secret<String>,
    secret_key: Secret<String>,
}

impl std::fmt::Debug for AnyPaySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyPaySigner")
            .field("api_id", &self.api_id)
            .finish_non_exhaustive()
    }
}

impl AnyPaySigner {
    pub fn new(api_id: String, api_key: Secret<String>, secret_key: Secret<String>) -> Self {
        Self {
            api_id,
            api_key,
            secret_key,
        }
    }
}

impl Signer for AnyPaySigner {
    fn sign(
        &self,
        method: SignedMethod,
        fields: &SignatureFields<'_>,
    ) -> Result<String, AnyPayError> {
        let mut ordered = Vec::with_capacity(method.fields().len());
        for field in method.fields() {
            let value = match field {
                SignatureField::MethodName => method.name(),
                SignatureField::ApiId => self.api_id.as_str(),
                SignatureField::ApiKey => self.api_key.expose_secret().as_str(),
                SignatureField::SecretKey => self.secret_key.expose_secret().as_str(),
                other => fields.get(*other).ok_or_else(|| {
                    AnyPayError::InvalidParameters(format!(
                        "{:?} is required to sign '{}'",
                        other,
                        method.name()
                    ))
                })?,
            };
            ordered.push(value);
        }

        Ok(build_signature(
            &ordered,
            method.separator(),
            method.algorithm(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> AnyPaySigner {
        AnyPaySigner::new(
            "1234".to_string(),
            Secret::new("api-key".to_string()),
            Secret::new("s".to_string()),
        )
    }

    #[test]
    fn test_known_digests() {
        assert_eq!(
            DigestAlgorithm::Md5.hex_digest(""),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            DigestAlgorithm::Sha256.hex_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_build_signature_concatenates_without_separator() {
        let signature = build_signature(&["balance", "1234", "api-key"], "", DigestAlgorithm::Sha256);
        assert_eq!(
            signature,
            DigestAlgorithm::Sha256.hex_digest("balance1234api-key")
        );
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_simple_methods_sign_name_id_key() {
        let signer = signer();
        for method in [
            SignedMethod::Balance,
            SignedMethod::Rates,
            SignedMethod::IpNotification,
        ] {
            let expected =
                DigestAlgorithm::Sha256.hex_digest(&format!("{}1234api-key", method.name()));
            assert_eq!(signer.sign(method, &SignatureFields::new()).unwrap(), expected);
        }
    }

    #[test]
    fn test_project_methods_include_project_id() {
        let signer = signer();
        let fields = SignatureFields::new().with(SignatureField::ProjectId, "77");

        assert_eq!(
            signer.sign(SignedMethod::Commissions, &fields).unwrap(),
            DigestAlgorithm::Sha256.hex_digest("commissions123477api-key")
        );
        assert_eq!(
            signer.sign(SignedMethod::Payments, &fields).unwrap(),
            DigestAlgorithm::Sha256.hex_digest("payments123477api-key")
        );
    }

    #[test]
    fn test_payout_field_order() {
        let fields = SignatureFields::new()
            .with(SignatureField::Wallet, "4111111111111111")
            .with(SignatureField::Amount, "10.50")
            .with(SignatureField::PayoutType, "card")
            .with(SignatureField::PayoutId, "p-1");

        assert_eq!(
            signer().sign(SignedMethod::CreatePayout, &fields).unwrap(),
            DigestAlgorithm::Sha256.hex_digest("create-payout1234p-1card10.504111111111111111api-key")
        );
    }

    #[test]
    fn test_merchant_link_uses_md5_with_colons() {
        let fields = SignatureFields::new()
            .with(SignatureField::Currency, "RUB")
            .with(SignatureField::Amount, "100.00")
            .with(SignatureField::MerchantId, "m1")
            .with(SignatureField::PayId, "p1");

        assert_eq!(
            signer().sign(SignedMethod::MerchantLink, &fields).unwrap(),
            DigestAlgorithm::Md5.hex_digest("RUB:100.00:s:m1:p1")
        );
    }

    #[test]
    fn test_signature_is_deterministic_and_sensitive() {
        let signer = signer();
        let base = SignatureFields::new()
            .with(SignatureField::PayoutId, "1")
            .with(SignatureField::PayoutType, "card")
            .with(SignatureField::Amount, "5")
            .with(SignatureField::Wallet, "w");

        let first = signer.sign(SignedMethod::CreatePayout, &base).unwrap();
        let second = signer.sign(SignedMethod::CreatePayout, &base).unwrap();
        assert_eq!(first, second);

        let changed = base.clone().with(SignatureField::Amount, "6");
        assert_ne!(first, signer.sign(SignedMethod::CreatePayout, &changed).unwrap());

        // Swapping two values changes the ordered string
        let swapped = base
            .with(SignatureField::PayoutId, "card")
            .with(SignatureField::PayoutType, "1");
        assert_ne!(first, signer.sign(SignedMethod::CreatePayout, &swapped).unwrap());
    }

    #[test]
    fn test_every_method_has_a_distinct_table_entry() {
        for method in SignedMethod::ALL {
            assert!(!method.fields().is_empty());
            if method == SignedMethod::MerchantLink {
                assert_eq!(method.algorithm(), DigestAlgorithm::Md5);
                assert!(!method.fields().contains(&SignatureField::MethodName));
            } else {
                assert_eq!(method.algorithm(), DigestAlgorithm::Sha256);
                assert_eq!(method.fields()[0], SignatureField::MethodName);
                assert_eq!(method.fields().last(), Some(&SignatureField::ApiKey));
            }
        }
    }

    #[test]
    fn test_missing_business_field_is_reported() {
        let err = signer()
            .sign(SignedMethod::Commissions, &SignatureFields::new())
            .unwrap_err();
        assert!(matches!(err, AnyPayError::InvalidParameters(_)));
        assert!(err.to_string().contains("ProjectId"));
    }
}
