// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::constants::{config as env_keys, http};
use crate::errors::ClientError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::env;

/// Username/password pair for HTTP basic authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `Basic <base64(user:password)>`
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw.as_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub url: String,
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub url: String,
    pub credentials: Option<Credentials>,
    pub user_agent: String,
    pub proxy: Option<ProxyConfig>,
    pub timeout_secs: u64,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, ClientError> {
        let defaults = Self::default();

        let credentials = env::var(env_keys::ENV_USER)
            .ok()
            .filter(|u| !u.is_empty())
            .map(|user| Credentials::new(user, env::var(env_keys::ENV_PASSWORD).unwrap_or_default()));

        let proxy = env::var(env_keys::ENV_PROXY)
            .ok()
            .filter(|p| !p.is_empty())
            .map(|url| ProxyConfig {
                url,
                credentials: env::var(env_keys::ENV_PROXY_USER)
                    .ok()
                    .filter(|u| !u.is_empty())
                    .map(|user| {
                        Credentials::new(
                            user,
                            env::var(env_keys::ENV_PROXY_PASSWORD).unwrap_or_default(),
                        )
                    }),
            });

        let timeout_secs = match env::var(env_keys::ENV_TIMEOUT_SECS) {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ClientError::Configuration(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    env_keys::ENV_TIMEOUT_SECS,
                    raw
                ))
            })?,
            Err(_) => defaults.timeout_secs,
        };

        Ok(Self {
            url: env::var(env_keys::ENV_URL).unwrap_or(defaults.url),
            credentials,
            user_agent: env::var(env_keys::ENV_USER_AGENT).unwrap_or(defaults.user_agent),
            proxy,
            timeout_secs,
            log_level: env::var(env_keys::ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_format: env::var(env_keys::ENV_LOG_FORMAT).unwrap_or(defaults.log_format),
        })
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Authorization header value, present only when a username is set.
    pub fn authorization(&self) -> Option<String> {
        self.credentials
            .as_ref()
            .filter(|c| !c.username.is_empty())
            .map(Credentials::basic_auth_header)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: env_keys::DEFAULT_URL.to_string(),
            credentials: None,
            user_agent: http::DEFAULT_USER_AGENT.to_string(),
            proxy: None,
            timeout_secs: env_keys::DEFAULT_TIMEOUT_SECS,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ALL_KEYS: [&str; 8] = [
        env_keys::ENV_URL,
        env_keys::ENV_USER,
        env_keys::ENV_PASSWORD,
        env_keys::ENV_USER_AGENT,
        env_keys::ENV_PROXY,
        env_keys::ENV_PROXY_USER,
        env_keys::ENV_PROXY_PASSWORD,
        env_keys::ENV_TIMEOUT_SECS,
    ];

    fn clear_env() {
        for key in ALL_KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_basic_auth_header() {
        let creds = Credentials::new("Aladdin", "open sesame");
        assert_eq!(creds.basic_auth_header(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }

    #[test]
    fn test_authorization_requires_username() {
        let config = ClientConfig::new("http://h/RPC2").with_credentials("", "secret");
        assert!(config.authorization().is_none());
        let config = config.with_credentials("bob", "");
        assert_eq!(config.authorization().as_deref(), Some("Basic Ym9iOg=="));
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.user_agent, http::DEFAULT_USER_AGENT);
        assert!(config.credentials.is_none());
        assert!(config.proxy.is_none());
        assert_eq!(config.timeout_secs, env_keys::DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_from_env() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var(env_keys::ENV_URL, "http://rpc.example:8080/RPC2");
        env::set_var(env_keys::ENV_USER, "alice");
        env::set_var(env_keys::ENV_PROXY, "http://proxy:3128");
        env::set_var(env_keys::ENV_TIMEOUT_SECS, "5");

        let config = ClientConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.url, "http://rpc.example:8080/RPC2");
        assert_eq!(config.credentials, Some(Credentials::new("alice", "")));
        assert_eq!(
            config.proxy,
            Some(ProxyConfig {
                url: "http://proxy:3128".to_string(),
                credentials: None
            })
        );
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_from_env_rejects_bad_timeout() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var(env_keys::ENV_TIMEOUT_SECS, "soon");

        let result = ClientConfig::from_env();
        clear_env();

        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }
}
