//! Loopback redirect listener for the browser login.
//!
//! Binds an ephemeral port on localhost, waits for the identity platform to
//! redirect the browser back with `?code=..&state=..`, then shuts down.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

use crate::error::{IdentityError, Result};

const SUCCESS_PAGE: &str = "<html><body><h3>Authentication complete.</h3>\
<p>You can close this window and return to the terminal.</p></body></html>";

const FAILURE_PAGE: &str = "<html><body><h3>Authentication failed.</h3>\
<p>Check the terminal for details.</p></body></html>";

/// Query parameters the identity platform appends to the redirect URI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Validate the callback against the expected state and extract the code.
    pub fn into_code(self, expected_state: &str) -> Result<String> {
        if let Some(error) = self.error {
            return Err(IdentityError::Authorization {
                error,
                description: self
                    .error_description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        if self.state.as_deref() != Some(expected_state) {
            return Err(IdentityError::StateMismatch);
        }

        self.code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| IdentityError::InvalidRequest("Callback is missing 'code'".to_string()))
    }
}

type Slot = Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>;

/// A running redirect listener.
pub struct CallbackServer {
    local_addr: SocketAddr,
    receiver: oneshot::Receiver<CallbackParams>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl CallbackServer {
    /// Bind the listener and start serving in the background.
    pub async fn bind(bind_addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr).await?;
        let local_addr = listener.local_addr()?;

        let (tx, receiver) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let slot: Slot = Arc::new(Mutex::new(Some(tx)));

        let router = Router::new()
            .route("/", get(handle_callback))
            .with_state(slot);

        tracing::debug!(addr = %local_addr, "Starting login redirect listener");
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .ok();
        });

        Ok(Self {
            local_addr,
            receiver,
            shutdown: Some(shutdown_tx),
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Redirect URI to register with the authorization request.
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}", self.local_addr.port())
    }

    /// Wait for the browser to hit the redirect URI.
    pub async fn wait(mut self, timeout: Duration) -> Result<CallbackParams> {
        let outcome = tokio::time::timeout(timeout, &mut self.receiver).await;
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
        match outcome {
            Ok(Ok(params)) => Ok(params),
            Ok(Err(_)) => Err(IdentityError::Config(
                "Redirect listener closed before a callback arrived".to_string(),
            )),
            Err(_) => Err(IdentityError::LoginTimeout(timeout.as_secs())),
        }
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
    }
}

/// Handle GET /?code=..&state=..
async fn handle_callback(
    State(slot): State<Slot>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    let failed = params.error.is_some();
    if let Some(tx) = slot.lock().await.take() {
        tx.send(params).ok();
    }
    if failed { Html(FAILURE_PAGE) } else { Html(SUCCESS_PAGE) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[test]
    fn test_into_code_valid() {
        let params = CallbackParams {
            code: Some("abc".to_string()),
            state: Some("xyz".to_string()),
            ..Default::default()
        };
        assert_eq!(params.into_code("xyz").unwrap(), "abc");
    }

    #[test]
    fn test_into_code_state_mismatch() {
        let params = CallbackParams {
            code: Some("abc".to_string()),
            state: Some("other".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            params.into_code("xyz"),
            Err(IdentityError::StateMismatch)
        ));
    }

    #[test]
    fn test_into_code_error_wins() {
        let params = CallbackParams {
            error: Some("access_denied".to_string()),
            error_description: Some("user cancelled".to_string()),
            ..Default::default()
        };
        let err = params.into_code("xyz").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Authorization failed: access_denied (user cancelled)"
        );
    }

    #[test]
    fn test_into_code_missing_code() {
        let params = CallbackParams {
            state: Some("xyz".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            params.into_code("xyz"),
            Err(IdentityError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_redirect_is_captured() {
        let server = CallbackServer::bind(loopback()).await.unwrap();
        let url = format!(
            "http://{}/?code=c0de&state=st4te",
            server.local_addr()
        );
        assert!(server.redirect_uri().starts_with("http://localhost:"));

        let browser = tokio::spawn(async move { reqwest::get(url).await.unwrap().text().await });
        let params = server.wait(Duration::from_secs(5)).await.unwrap();
        let page = browser.await.unwrap().unwrap();

        assert_eq!(params.code.as_deref(), Some("c0de"));
        assert_eq!(params.state.as_deref(), Some("st4te"));
        assert!(page.contains("Authentication complete"));
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let server = CallbackServer::bind(loopback()).await.unwrap();
        let err = server.wait(Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, IdentityError::LoginTimeout(0)));
    }
}
