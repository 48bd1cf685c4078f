/*!
 * Mobile-money payment gateway client.
 *
 * Charges are a two-step flow: initiate a charge against a phone number
 * and momo provider, then verify the transaction reference until it
 * reaches a terminal state. The payer approves the debit on their
 * handset in between, so a freshly initiated charge is almost always
 * pending on the first verify.
 */

use std::time::Duration;

use log::error;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::PaymentError;

/// Mobile-money network operators supported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomoProvider {
    /// MTN Mobile Money
    Mtn,
    /// Telecel (Vodafone) Cash
    Vodafone,
    /// AirtelTigo Money
    AirtelTigo,
}

impl MomoProvider {
    /// Gateway wire code for the operator
    pub fn code(&self) -> &'static str {
        match self {
            Self::Mtn => "mtn",
            Self::Vodafone => "vod",
            Self::AirtelTigo => "atl",
        }
    }
}

impl std::fmt::Display for MomoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for MomoProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mtn" => Ok(Self::Mtn),
            "vod" | "vodafone" | "telecel" => Ok(Self::Vodafone),
            "atl" | "airteltigo" | "tigo" => Ok(Self::AirtelTigo),
            _ => Err(anyhow::anyhow!("Unknown mobile-money provider: {}", s)),
        }
    }
}

/// Terminal or pending state of a charge as reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeState {
    /// Payment confirmed
    Success,
    /// Payment failed
    Failed,
    /// Payer abandoned the prompt
    Abandoned,
    /// Still waiting on the payer
    Pending,
}

impl ChargeState {
    /// Map a gateway status string to a charge state
    pub fn from_gateway(status: &str) -> Self {
        match status.to_lowercase().as_str() {
            "success" => Self::Success,
            "failed" => Self::Failed,
            "abandoned" => Self::Abandoned,
            // "ongoing", "pending", "pay_offline", "send_otp" all mean
            // the payer still has to act
            _ => Self::Pending,
        }
    }

    /// Whether the state is terminal
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Result of initiating a charge
#[derive(Debug, Clone)]
pub struct ChargeOutcome {
    /// Gateway transaction reference
    pub reference: String,
    /// State right after initiation
    pub state: ChargeState,
    /// Instruction text for the payer, when the gateway supplies one
    pub display_text: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChargeBody<'a> {
    amount: i64,
    currency: &'a str,
    reference: &'a str,
    mobile_money: MobileMoneyBody<'a>,
}

#[derive(Debug, Serialize)]
struct MobileMoneyBody<'a> {
    phone: &'a str,
    provider: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayEnvelope {
    status: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<GatewayData>,
}

#[derive(Debug, Deserialize)]
struct GatewayData {
    #[serde(default)]
    reference: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    display_text: Option<String>,
}

/// HTTP client for the mobile-money gateway
pub struct MomoGateway {
    /// HTTP client for gateway requests
    client: Client,
    /// Secret key for authentication
    secret_key: String,
    /// Gateway base URL
    endpoint: String,
}

impl std::fmt::Debug for MomoGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret key
        f.debug_struct("MomoGateway")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl MomoGateway {
    /// Create a new gateway client
    pub fn new(secret_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            secret_key: secret_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Initiate a mobile-money charge.
    pub async fn initiate_charge(
        &self,
        amount_pesewas: i64,
        currency: &str,
        phone: &str,
        provider: MomoProvider,
        reference: &str,
    ) -> Result<ChargeOutcome, PaymentError> {
        let url = format!("{}/charge", self.endpoint.trim_end_matches('/'));
        let body = ChargeBody {
            amount: amount_pesewas,
            currency,
            reference,
            mobile_money: MobileMoneyBody {
                phone,
                provider: provider.code(),
            },
        };

        let envelope = self.post_envelope(&url, &body).await?;
        let data = envelope
            .data
            .ok_or_else(|| PaymentError::ParseError("charge response had no data".to_string()))?;

        let reference = if data.reference.is_empty() {
            reference.to_string()
        } else {
            data.reference
        };

        Ok(ChargeOutcome {
            reference,
            state: ChargeState::from_gateway(&data.status),
            display_text: data.display_text,
        })
    }

    /// Verify a previously initiated charge.
    pub async fn verify(&self, reference: &str) -> Result<ChargeState, PaymentError> {
        let url = format!(
            "{}/transaction/verify/{}",
            self.endpoint.trim_end_matches('/'),
            reference
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .send()
            .await
            .map_err(|e| PaymentError::GatewayUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Gateway verify error ({}): {}", status, message);
            if status.as_u16() == 404 {
                return Err(PaymentError::UnknownReference(reference.to_string()));
            }
            return Err(PaymentError::GatewayRejected {
                status_code: status.as_u16(),
                message,
            });
        }

        let envelope: GatewayEnvelope = response
            .json()
            .await
            .map_err(|e| PaymentError::ParseError(e.to_string()))?;

        if !envelope.status {
            return Err(PaymentError::GatewayRejected {
                status_code: 200,
                message: envelope.message,
            });
        }

        let data = envelope
            .data
            .ok_or_else(|| PaymentError::ParseError("verify response had no data".to_string()))?;

        Ok(ChargeState::from_gateway(&data.status))
    }

    async fn post_envelope<B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<GatewayEnvelope, PaymentError> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| PaymentError::GatewayUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Gateway error ({}): {}", status, message);
            return Err(PaymentError::GatewayRejected {
                status_code: status.as_u16(),
                message,
            });
        }

        let envelope: GatewayEnvelope = response
            .json()
            .await
            .map_err(|e| PaymentError::ParseError(e.to_string()))?;

        if !envelope.status {
            return Err(PaymentError::GatewayRejected {
                status_code: 200,
                message: envelope.message,
            });
        }

        Ok(envelope)
    }
}

/// Generate a fresh client transaction reference.
pub fn new_reference() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
    let mut rng = rand::rng();
    let suffix: String = (0..12)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();
    format!("LF-{}", suffix)
}
