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

// Command-line entry point: performs one XML-RPC call and prints the result
use std::any::Any;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::debug;

use xmlrpc_client::client::{Client, ClientEvent};
use xmlrpc_client::config::{ClientConfig, Credentials, ProxyConfig};
use xmlrpc_client::literal::parse_param;
use xmlrpc_client::value::Value;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Endpoint URL (overrides XMLRPC_URL)
    #[arg(short, long)]
    url: Option<String>,

    /// Basic-auth username
    #[arg(long)]
    user: Option<String>,

    /// Basic-auth password
    #[arg(long, requires = "user")]
    password: Option<String>,

    /// User-Agent header value
    #[arg(long)]
    user_agent: Option<String>,

    /// Proxy URL, e.g. "http://proxy:3128"
    #[arg(long)]
    proxy: Option<String>,

    /// Request timeout in seconds (0 disables)
    #[arg(long)]
    timeout: Option<u64>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Remote method name
    method: String,

    /// Parameters: i4:5, bool:true, double:1.5, str:x, b64:aGk=,
    /// datetime:20261017T10:00:00, nil, json:{..}; bare text is a string
    params: Vec<String>,
}

impl Cli {
    fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(user) = &self.user {
            config.credentials = Some(Credentials::new(
                user.clone(),
                self.password.clone().unwrap_or_default(),
            ));
        }
        if let Some(agent) = &self.user_agent {
            config.user_agent = agent.clone();
        }
        if let Some(proxy) = &self.proxy {
            let credentials = config.proxy.take().and_then(|p| p.credentials);
            config.proxy = Some(ProxyConfig {
                url: proxy.clone(),
                credentials,
            });
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    install_panic_hook();

    let config = cli.apply(ClientConfig::from_env().context("Failed to load configuration")?);
    init_tracing(&config)?;

    let params = cli
        .params
        .iter()
        .map(|p| parse_param(p).with_context(|| format!("Invalid parameter {:?}", p)))
        .collect::<Result<Vec<Value>>>()?;

    let (client, mut events) = Client::connect(config).context("Failed to create client")?;
    let id = client
        .submit(&cli.method, &params)
        .with_context(|| format!("Failed to submit {:?}", cli.method))?;
    debug!(request_id = %id, "Waiting for response");

    let event = events
        .recv()
        .await
        .ok_or_else(|| anyhow!("Client shut down before the call completed"))?;

    match event {
        ClientEvent::Done { value, .. } => {
            if cli.json {
                let json = serde_json::Value::from(value);
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                print!("{}", value.pprint());
            }
            Ok(ExitCode::SUCCESS)
        }
        ClientEvent::Failed { code, message, .. } => {
            eprintln!("fault {}: {}", code, message);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown location".to_string());
        eprintln!(
            "{} panicked: {} at {}",
            env!("CARGO_PKG_NAME"),
            panic_message(info.payload()),
            location
        );
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn init_tracing(config: &ClientConfig) -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the result; logs go to stderr.
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        subscriber.json().try_init().map_err(|e| anyhow!(e))?;
    } else {
        subscriber.try_init().map_err(|e| anyhow!(e))?;
    }

    Ok(())
}
