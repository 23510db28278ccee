//! Payment configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key
    pub stripe_api_key: String,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,

    /// Where the hosted checkout sends the buyer after paying
    pub success_url: String,

    /// Where the hosted checkout sends the buyer on abandon
    pub cancel_url: String,

    /// Stripe API base URL (overridable for stubs)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Outbound request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Allowed clock skew for webhook timestamps, in seconds
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_secs: u64,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_") || self.stripe_api_key.starts_with("rk_test_")
    }

    pub fn api_key(&self) -> SecretString {
        SecretString::new(self.stripe_api_key.clone())
    }

    pub fn webhook_secret(&self) -> SecretString {
        SecretString::new(self.stripe_webhook_secret.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn webhook_tolerance(&self) -> Duration {
        Duration::from_secs(self.webhook_tolerance_secs)
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYMENT__STRIPE_WEBHOOK_SECRET",
            ));
        }

        // Secret or restricted keys only; publishable keys cannot create sessions
        if !self.stripe_api_key.starts_with("sk_") && !self.stripe_api_key.starts_with("rk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        if !is_http_url(&self.success_url) {
            return Err(ValidationError::InvalidRedirectUrl("success_url"));
        }
        if !is_http_url(&self.cancel_url) {
            return Err(ValidationError::InvalidRedirectUrl("cancel_url"));
        }
        if !is_http_url(&self.api_base_url) {
            return Err(ValidationError::InvalidApiBaseUrl);
        }
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            success_url: String::new(),
            cancel_url: String::new(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            webhook_tolerance_secs: default_webhook_tolerance(),
        }
    }
}

fn is_http_url(raw: &str) -> bool {
    reqwest::Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_webhook_tolerance() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn valid() -> PaymentConfig {
        PaymentConfig {
            stripe_api_key: "sk_test_abcd1234".to_string(),
            stripe_webhook_secret: "whsec_xyz789".to_string(),
            success_url: "https://app.example.com/success".to_string(),
            cancel_url: "https://app.example.com/cancel".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = PaymentConfig::default();
        assert_eq!(config.api_base_url, "https://api.stripe.com");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.webhook_tolerance(), Duration::from_secs(300));
    }

    #[test]
    fn test_secrets_are_wrapped() {
        let config = valid();
        assert_eq!(config.api_key().expose_secret(), "sk_test_abcd1234");
        assert_eq!(config.webhook_secret().expose_secret(), "whsec_xyz789");
    }

    #[test]
    fn test_is_test_mode() {
        assert!(valid().is_test_mode());
        let live = PaymentConfig {
            stripe_api_key: "sk_live_xxx".to_string(),
            ..valid()
        };
        assert!(!live.is_test_mode());
    }

    #[test]
    fn test_validation_missing_secrets() {
        assert_eq!(
            PaymentConfig::default().validate(),
            Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"))
        );
        let config = PaymentConfig {
            stripe_webhook_secret: String::new(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_key_prefixes() {
        let publishable = PaymentConfig {
            stripe_api_key: "pk_test_xxx".to_string(),
            ..valid()
        };
        assert_eq!(publishable.validate(), Err(ValidationError::InvalidStripeKey));

        let restricted = PaymentConfig {
            stripe_api_key: "rk_test_xxx".to_string(),
            ..valid()
        };
        assert!(restricted.validate().is_ok());

        let bad_secret = PaymentConfig {
            stripe_webhook_secret: "secret_xxx".to_string(),
            ..valid()
        };
        assert_eq!(
            bad_secret.validate(),
            Err(ValidationError::InvalidStripeWebhookSecret)
        );
    }

    #[test]
    fn test_validation_redirect_urls() {
        let config = PaymentConfig {
            success_url: "ftp://example.com".to_string(),
            ..valid()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidRedirectUrl("success_url"))
        );

        let config = PaymentConfig {
            cancel_url: "/relative".to_string(),
            ..valid()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidRedirectUrl("cancel_url"))
        );
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid().validate().is_ok());
    }
}
