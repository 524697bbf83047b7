use crate::api::response::{classify, extract_result};
use crate::api::types::{
    Balance, Commissions, IpNotification, PaymentList, PaymentsFilter, PayoutRequest,
    PayoutResult, Rates,
};
use crate::core::config::AnyPayConfig;
use crate::core::errors::AnyPayError;
use crate::core::kernel::{
    AnyPaySigner, ReqwestRest, RestClient, SignatureField, SignatureFields, SignedMethod, Signer,
};
use crate::core::types::{RemoteMethodRequest, RemoteMethodResult};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::instrument;
use url::form_urlencoded;

/// `AnyPay` API client
///
/// Holds validated configuration, the request signer and the transport. All
/// networked methods take `&self`, so one client can be shared across tasks
/// (wrap it in an `Arc` or clone it; clones share the transport pool).
#[derive(Clone)]
pub struct AnyPayClient<R: RestClient = ReqwestRest> {
    rest: R,
    config: AnyPayConfig,
    signer: Arc<dyn Signer>,
}

impl<R: RestClient> std::fmt::Debug for AnyPayClient<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyPayClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<R: RestClient> AnyPayClient<R> {
    /// Create a client over an existing transport.
    ///
    /// Fails with `AnyPayError::ConfigError` when a credential is missing, before
    /// any request can be made.
    pub fn new(config: AnyPayConfig, rest: R) -> Result<Self, AnyPayError> {
        config.validate()?;
        let signer = Self::signer_for(&config);

        Ok(Self {
            rest,
            config,
            signer,
        })
    }

    fn signer_for(config: &AnyPayConfig) -> Arc<dyn Signer> {
        Arc::new(AnyPaySigner::new(
            config.api_id.clone(),
            config.api_key.clone(),
            config.secret_key.clone(),
        ))
    }

    pub fn config(&self) -> &AnyPayConfig {
        &self.config
    }

    /// Replace the configuration; the current one stays in place if the new one is invalid
    pub fn set_config(&mut self, config: AnyPayConfig) -> Result<&mut Self, AnyPayError> {
        config.validate()?;
        self.signer = Self::signer_for(&config);
        self.config = config;
        Ok(self)
    }

    /// Call a remote method by name with already-signed parameters.
    ///
    /// The request goes to `{api_url}/{method}/{api_id}`; the decoded body is
    /// returned only when it carries `result`.
    #[instrument(skip(self, method, params), fields(method = %method, param_count = params.len()))]
    pub async fn call(&self, method: &str, params: Vec<(String, String)>) -> RemoteMethodResult {
        self.execute(RemoteMethodRequest {
            method: method.to_string(),
            params,
        })
        .await
    }

    async fn execute(&self, request: RemoteMethodRequest) -> RemoteMethodResult {
        let url = format!(
            "{}/{}/{}",
            self.config.resolved_api_url(),
            request.method,
            self.config.api_id
        );

        let body = self.rest.get(&url, &request.params).await?;
        classify(&request.method, body)
    }

    async fn fetch<T>(&self, request: RemoteMethodRequest) -> Result<T, AnyPayError>
    where
        T: DeserializeOwned,
    {
        let method = request.method.clone();
        let body = self.execute(request).await?;
        extract_result(&method, body)
    }

    fn sign(
        &self,
        method: SignedMethod,
        fields: &SignatureFields<'_>,
    ) -> Result<String, AnyPayError> {
        self.signer.sign(method, fields)
    }

    fn project_id(&self, project_id: Option<u64>) -> Result<u64, AnyPayError> {
        project_id.or(self.config.project_id).ok_or_else(|| {
            AnyPayError::InvalidParameters(
                "project_id was not given and none is configured".to_string(),
            )
        })
    }

    fn simple_request(&self, method: SignedMethod) -> Result<RemoteMethodRequest, AnyPayError> {
        let signature = self.sign(method, &SignatureFields::new())?;
        Ok(RemoteMethodRequest::new(method.name()).signed(signature))
    }

    /// Current account balance
    #[instrument(skip(self))]
    pub async fn get_balance(&self) -> Result<Decimal, AnyPayError> {
        let request = self.simple_request(SignedMethod::Balance)?;
        let balance: Balance = self.fetch(request).await?;
        Ok(balance.balance)
    }

    /// Deposit and withdrawal rates
    #[instrument(skip(self))]
    pub async fn get_rates(&self) -> Result<Rates, AnyPayError> {
        let request = self.simple_request(SignedMethod::Rates)?;
        self.fetch(request).await
    }

    /// Commissions for a project, falling back to the configured project
    #[instrument(skip(self))]
    pub async fn get_commissions(&self, project_id: Option<u64>) -> Result<Commissions, AnyPayError> {
        let project_id = self.project_id(project_id)?.to_string();
        let fields = SignatureFields::new().with(SignatureField::ProjectId, &project_id);
        let signature = self.sign(SignedMethod::Commissions, &fields)?;

        let request = RemoteMethodRequest::new(SignedMethod::Commissions.name())
            .param("project_id", project_id.as_str())
            .signed(signature);
        self.fetch(request).await
    }

    /// Payments of a project
    ///
    /// Only the project id is signed; filter parameters travel unsigned.
    #[instrument(skip(self, filter))]
    pub async fn get_payments(
        &self,
        project_id: Option<u64>,
        filter: &PaymentsFilter,
    ) -> Result<PaymentList, AnyPayError> {
        let project_id = self.project_id(project_id)?.to_string();
        let fields = SignatureFields::new().with(SignatureField::ProjectId, &project_id);
        let signature = self.sign(SignedMethod::Payments, &fields)?;

        let request = RemoteMethodRequest::new(SignedMethod::Payments.name())
            .param("project_id", project_id.as_str())
            .optional_param("trans_id", filter.trans_id.as_deref())
            .optional_param("pay_id", filter.pay_id.as_deref())
            .optional_param("offset", filter.offset.map(|offset| offset.to_string()))
            .signed(signature);
        self.fetch(request).await
    }

    /// Addresses the provider sends notifications from
    #[instrument(skip(self))]
    pub async fn get_service_ip(&self) -> Result<IpNotification, AnyPayError> {
        let request = self.simple_request(SignedMethod::IpNotification)?;
        self.fetch(request).await
    }

    /// Create a payout
    #[instrument(skip(self, payout), fields(payout_id = %payout.payout_id, payout_type = %payout.payout_type))]
    pub async fn create_payout(&self, payout: &PayoutRequest) -> Result<PayoutResult, AnyPayError> {
        let amount = payout.amount.to_string();
        let fields = SignatureFields::new()
            .with(SignatureField::PayoutId, &payout.payout_id)
            .with(SignatureField::PayoutType, &payout.payout_type)
            .with(SignatureField::Amount, &amount)
            .with(SignatureField::Wallet, &payout.wallet);
        let signature = self.sign(SignedMethod::CreatePayout, &fields)?;

        let request = RemoteMethodRequest::new(SignedMethod::CreatePayout.name())
            .param("payout_id", payout.payout_id.as_str())
            .param("payout_type", payout.payout_type.as_str())
            .param("amount", amount.as_str())
            .param("wallet", payout.wallet.as_str())
            .optional_param("wallet_currency", payout.wallet_currency.as_deref())
            .optional_param(
                "commission_type",
                payout.commission_type.map(|kind| kind.as_str()),
            )
            .optional_param("status_url", payout.status_url.as_deref())
            .signed(signature);
        self.fetch(request).await
    }

    /// Build a signed link to the hosted payment page. No network I/O.
    ///
    /// `amount` is rendered with `Decimal`'s locale-independent formatting and the
    /// same text is both signed and sent.
    pub fn create_payment_link(
        &self,
        currency: &str,
        amount: Decimal,
        merchant_id: &str,
        pay_id: &str,
    ) -> Result<String, AnyPayError> {
        let amount = amount.to_string();
        let fields = SignatureFields::new()
            .with(SignatureField::Currency, currency)
            .with(SignatureField::Amount, &amount)
            .with(SignatureField::MerchantId, merchant_id)
            .with(SignatureField::PayId, pay_id);
        let signature = self.sign(SignedMethod::MerchantLink, &fields)?;

        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("currency", currency)
            .append_pair("amount", &amount)
            .append_pair("merchant_id", merchant_id)
            .append_pair("pay_id", pay_id)
            .append_pair("sign", &signature)
            .finish();

        let base = self.config.resolved_merchant_url();
        let joiner = if base.contains('?') { '&' } else { '?' };
        Ok(format!("{}{}{}", base, joiner, query))
    }
}

impl AnyPayClient<ReqwestRest> {
    /// Create a client with the default reqwest transport
    pub fn from_config(config: AnyPayConfig) -> Result<Self, AnyPayError> {
        crate::api::builder::AnyPayBuilder::new(config).build()
    }
}
