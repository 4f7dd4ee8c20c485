//! Minimal W3C WebDriver client: just enough of the protocol to load a page
//! in a headless browser and read back its DOM.
//!
//! Speaks JSON over HTTP to any WebDriver server (chromedriver,
//! geckodriver, Selenium). Sessions are scoped: [`WebDriverSession::close`]
//! deletes the remote session, and a session dropped without being closed
//! schedules the delete on the runtime so cancelled renders do not leak
//! browser processes.

use std::time::Duration;

use reqwest::{Client, Method};
use serde_json::{json, Value};

use crate::error::ScraperError;

/// Poll interval while waiting for listing cards to appear.
const SETTLE_POLL: Duration = Duration::from_millis(250);

/// HTTP handle on a WebDriver server.
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    http: Client,
    endpoint: String,
}

impl WebDriverClient {
    /// Creates a client for the WebDriver server at `endpoint`
    /// (e.g. `"http://127.0.0.1:9515"`).
    ///
    /// `command_timeout` bounds each individual protocol request.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str, command_timeout: Duration) -> Result<Self, ScraperError> {
        let http = Client::builder().timeout(command_timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
        })
    }

    /// Starts a headless Chrome session presenting `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::WebDriver`] if the server refuses the session
    /// or its reply carries no session id.
    pub async fn open_session(&self, user_agent: &str) -> Result<WebDriverSession, ScraperError> {
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": [
                            "--headless=new",
                            "--disable-gpu",
                            "--no-sandbox",
                            "--window-size=1366,900",
                            format!("--user-agent={user_agent}"),
                        ]
                    }
                }
            }
        });

        let reply = self
            .command(Method::POST, "session", "new session", Some(capabilities))
            .await?;
        let id = reply
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| ScraperError::WebDriver {
                command: "new session".to_owned(),
                reason: "reply carried no sessionId".to_owned(),
            })?
            .to_owned();

        tracing::debug!(session_id = %id, "webdriver session opened");
        Ok(WebDriverSession {
            driver: self.clone(),
            id,
            closed: false,
        })
    }

    /// Sends one protocol command and returns the reply's `value` member.
    async fn command(
        &self,
        method: Method,
        path: &str,
        name: &str,
        body: Option<Value>,
    ) -> Result<Value, ScraperError> {
        let url = format!("{}/{path}", self.endpoint);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| ScraperError::WebDriver {
            command: name.to_owned(),
            reason: e.to_string(),
        })?;
        let status = response.status();
        let reply: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let error = reply
                .pointer("/value/error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            let message = reply
                .pointer("/value/message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            return Err(ScraperError::WebDriver {
                command: name.to_owned(),
                reason: format!("HTTP {}: {error} {message}", status.as_u16())
                    .trim_end()
                    .to_owned(),
            });
        }

        // Legacy JSON-wire servers put sessionId at the top level.
        match reply {
            Value::Object(mut map) => {
                let mut value = map.remove("value").unwrap_or(Value::Null);
                if let (Some(id), Value::Object(inner)) = (map.remove("sessionId"), &mut value) {
                    inner.entry("sessionId").or_insert(id);
                }
                Ok(value)
            }
            _ => Ok(Value::Null),
        }
    }
}

/// One live browser session.
///
/// Call [`Self::close`] on every path; dropping an open session falls back
/// to a fire-and-forget delete.
#[derive(Debug)]
pub struct WebDriverSession {
    driver: WebDriverClient,
    id: String,
    closed: bool,
}

impl WebDriverSession {
    async fn command(
        &self,
        method: Method,
        suffix: &str,
        name: &str,
        body: Option<Value>,
    ) -> Result<Value, ScraperError> {
        let path = format!("session/{}/{suffix}", self.id);
        self.driver.command(method, &path, name, body).await
    }

    /// Bounds how long the browser waits for a navigation's load event.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::WebDriver`] if the server rejects the command.
    pub async fn set_page_load_timeout(&self, timeout: Duration) -> Result<(), ScraperError> {
        let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.command(
            Method::POST,
            "timeouts",
            "set timeouts",
            Some(json!({ "pageLoad": ms })),
        )
        .await?;
        Ok(())
    }

    /// Navigates to `url` and waits for the load event.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::WebDriver`] on navigation failure or page-load
    /// timeout.
    pub async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        self.command(Method::POST, "url", "navigate", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    /// Number of elements currently matching the CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::WebDriver`] if the server rejects the query.
    pub async fn count_elements(&self, css: &str) -> Result<usize, ScraperError> {
        let found = self
            .command(
                Method::POST,
                "elements",
                "find elements",
                Some(json!({ "using": "css selector", "value": css })),
            )
            .await?;
        Ok(found.as_array().map_or(0, Vec::len))
    }

    /// Polls until `css` matches at least one element or `settle` elapses.
    ///
    /// Returns `true` if something matched. A miss is not an error: the DOM
    /// extractor has its own fallback selectors.
    pub async fn wait_for(&self, css: &str, settle: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + settle;
        loop {
            match self.count_elements(css).await {
                Ok(n) if n > 0 => return true,
                Ok(_) => {}
                Err(e) => tracing::debug!(error = %e, "element poll failed"),
            }
            if tokio::time::Instant::now() + SETTLE_POLL > deadline {
                return false;
            }
            tokio::time::sleep(SETTLE_POLL).await;
        }
    }

    /// Serialized DOM of the current page.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::WebDriver`] if the command fails or the reply
    /// is not a string.
    pub async fn page_source(&self) -> Result<String, ScraperError> {
        match self
            .command(Method::GET, "source", "get page source", None)
            .await?
        {
            Value::String(html) => Ok(html),
            other => Err(ScraperError::WebDriver {
                command: "get page source".to_owned(),
                reason: format!("expected a string, got {other}"),
            }),
        }
    }

    /// Deletes the remote session. Failures are logged, never returned.
    pub async fn close(mut self) {
        self.closed = true;
        let path = format!("session/{}", self.id);
        match self
            .driver
            .command(Method::DELETE, &path, "delete session", None)
            .await
        {
            Ok(_) => tracing::debug!(session_id = %self.id, "webdriver session closed"),
            Err(e) => tracing::warn!(session_id = %self.id, error = %e, "failed to close webdriver session"),
        }
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(session_id = %self.id, "webdriver session dropped outside a runtime; not closed");
            return;
        };
        let driver = self.driver.clone();
        let path = format!("session/{}", self.id);
        handle.spawn(async move {
            if let Err(e) = driver
                .command(Method::DELETE, &path, "delete session", None)
                .await
            {
                tracing::warn!(error = %e, "failed to close abandoned webdriver session");
            }
        });
    }
}
