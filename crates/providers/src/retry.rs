//! Bounded retry for transient provider failures.
//!
//! Wraps a single provider and re-invokes it when a completion fails in a
//! way worth retrying (rate limit, timeout, network, 5xx). Authentication
//! and client errors surface immediately. The agent loop above never
//! retries on its own; this wrapper is the only retry layer.

use async_trait::async_trait;
use infoagent_core::error::ProviderError;
use infoagent_core::provider::*;
use std::sync::Arc;
use tracing::warn;

/// Default number of additional attempts after the first failure.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// A provider that wraps another and retries transient failures.
pub struct RetryProvider {
    inner: Arc<dyn infoagent_core::Provider>,
    max_retries: u32,
}

impl RetryProvider {
    /// Wrap a provider with the default retry budget.
    pub fn new(inner: Arc<dyn infoagent_core::Provider>) -> Self {
        Self {
            inner,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Override the number of additional attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

#[async_trait]
impl infoagent_core::Provider for RetryProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let mut attempt = 0u32;

        loop {
            match self.inner.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        provider = %self.inner.name(),
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "Retry: transient provider failure, trying again"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infoagent_core::message::Message;
    use std::sync::Mutex;

    /// A mock provider that always fails with the given error.
    struct FailingProvider {
        name: String,
        error: ProviderError,
        call_count: Mutex<usize>,
    }

    impl FailingProvider {
        fn new(name: &str, error: ProviderError) -> Self {
            Self {
                name: name.into(),
                error,
                call_count: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl infoagent_core::Provider for FailingProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            *self.call_count.lock().unwrap() += 1;
            Err(self.error.clone())
        }
    }

    /// A mock provider that fails N times, then succeeds.
    struct FlakyProvider {
        failures: usize,
        call_count: Mutex<usize>,
    }

    impl FlakyProvider {
        fn new(failures: usize) -> Self {
            Self {
                failures,
                call_count: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl infoagent_core::Provider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            if *count <= self.failures {
                return Err(ProviderError::Network("connection reset".into()));
            }
            Ok(ProviderResponse {
                message: Message::assistant("success"),
                usage: None,
                model: "test-model".into(),
            })
        }
    }

    fn test_request() -> ProviderRequest {
        ProviderRequest {
            model: "test".into(),
            messages: vec![Message::user("hello")],
            temperature: 0.0,
            max_tokens: None,
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn succeeds_without_retrying() {
        let inner = Arc::new(FlakyProvider::new(0));
        let retry = RetryProvider::new(inner.clone());

        let result = retry.complete(test_request()).await;
        assert!(result.is_ok());
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn retries_transient_failure_then_succeeds() {
        let inner = Arc::new(FlakyProvider::new(1));
        let retry = RetryProvider::new(inner.clone());

        let result = retry.complete(test_request()).await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap().message.content, "success");
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn exhausts_retry_budget() {
        let inner = Arc::new(FailingProvider::new(
            "down",
            ProviderError::Network("conn refused".into()),
        ));
        let retry = RetryProvider::new(inner.clone());

        let result = retry.complete(test_request()).await;
        assert!(result.is_err());
        // 1 initial attempt + 2 retries
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn auth_failure_is_not_retried() {
        let inner = Arc::new(FailingProvider::new(
            "locked",
            ProviderError::AuthenticationFailed("bad key".into()),
        ));
        let retry = RetryProvider::new(inner.clone());

        let result = retry.complete(test_request()).await;
        assert!(matches!(
            result.unwrap_err(),
            ProviderError::AuthenticationFailed(_)
        ));
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let inner = Arc::new(FailingProvider::new(
            "bad-request",
            ProviderError::ApiError {
                status_code: 400,
                message: "bad request".into(),
            },
        ));
        let retry = RetryProvider::new(inner.clone());

        let result = retry.complete(test_request()).await;
        assert!(result.is_err());
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn server_error_is_retried() {
        let inner = Arc::new(FailingProvider::new(
            "overloaded",
            ProviderError::ApiError {
                status_code: 503,
                message: "overloaded".into(),
            },
        ));
        let retry = RetryProvider::new(inner.clone()).with_max_retries(1);

        let result = retry.complete(test_request()).await;
        assert!(result.is_err());
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn custom_retry_budget() {
        let inner = Arc::new(FlakyProvider::new(4));
        let retry = RetryProvider::new(inner.clone()).with_max_retries(4);

        let result = retry.complete(test_request()).await;
        assert!(result.is_ok());
        assert_eq!(inner.calls(), 5);
    }

    #[test]
    fn name_passes_through() {
        let inner = Arc::new(FlakyProvider::new(0));
        let retry = RetryProvider::new(inner);
        assert_eq!(retry.name(), "flaky");
    }
}
