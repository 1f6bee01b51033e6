//! Reqwest-based gateway client

use std::time::Duration;

use async_trait::async_trait;
use tracing::{instrument, warn};

use oficio_common::PaymentConfig;
use oficio_core::entities::PaymentStatus;
use oficio_core::error::DomainError;
use oficio_core::traits::{PaymentGateway, PixCharge};
use oficio_core::value_objects::Price;

use crate::types::{ChargeResponse, CreateChargeRequest, StatusResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the PIX gateway
#[derive(Clone)]
pub struct PixClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PixClient {
    /// Build a client against the configured gateway
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::GatewayError(e.to_string()))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &PaymentConfig) -> Result<Self, DomainError> {
        Self::new(config.gateway_url.clone(), config.api_key.clone())
    }

    fn gateway_error(err: reqwest::Error) -> DomainError {
        DomainError::GatewayError(err.to_string())
    }
}

#[async_trait]
impl PaymentGateway for PixClient {
    #[instrument(skip(self))]
    async fn create_charge(&self, amount: Price, reference: &str) -> Result<PixCharge, DomainError> {
        let body = CreateChargeRequest {
            amount: amount.centavos(),
            reference,
        };

        let response = self
            .http
            .post(format!("{}/v1/charges", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::gateway_error)?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(status = %status, reference, "Charge creation rejected");
            return Err(DomainError::GatewayError(format!(
                "charge creation failed with status {status}"
            )));
        }

        let charge: ChargeResponse = response.json().await.map_err(Self::gateway_error)?;

        Ok(PixCharge {
            pix_id: charge.pix_id,
            br_code: charge.br_code,
            br_code_base64: charge.br_code_base64,
            expires_at: charge.expires_at,
        })
    }

    #[instrument(skip(self))]
    async fn get_status(&self, pix_id: &str) -> Result<PaymentStatus, DomainError> {
        let response = self
            .http
            .get(format!("{}/v1/charges/{pix_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(Self::gateway_error)?;

        if !response.status().is_success() {
            return Err(DomainError::GatewayError(format!(
                "status query failed with status {}",
                response.status()
            )));
        }

        let status: StatusResponse = response.json().await.map_err(Self::gateway_error)?;
        Ok(status.status)
    }
}
