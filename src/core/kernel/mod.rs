/// `AnyPay` kernel - transport and authentication building blocks
///
/// ## Transport Layer
/// - `RestClient`: HTTP transport interface, injectable for tests
/// - `ReqwestRest`: reqwest-backed implementation with a keep-alive pool
///
/// ## Authentication
/// - `SignedMethod`: per-method signing table (field order, separator, digest)
/// - `Signer` / `AnyPaySigner`: fills in credentials and produces the hex signature
///
/// # Example
/// ```rust
/// use anypay::core::kernel::{build_signature, DigestAlgorithm, SignedMethod};
///
/// let sign = build_signature(
///     &[SignedMethod::Balance.name(), "1234", "api-key"],
///     SignedMethod::Balance.separator(),
///     SignedMethod::Balance.algorithm(),
/// );
/// assert_eq!(sign, DigestAlgorithm::Sha256.hex_digest("balance1234api-key"));
/// ```
pub mod rest;
pub mod signer;

pub use rest::{ReqwestRest, RestClient, RestClientBuilder, RestClientConfig};
pub use signer::{
    build_signature, AnyPaySigner, DigestAlgorithm, SignatureField, SignatureFields,
    SignedMethod, Signer,
};
