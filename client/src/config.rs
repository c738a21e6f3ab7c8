use std::str::FromStr;
use std::time::Duration;

use anyhow::{format_err, Result};
use configparser::ini::Ini;
use solana_sdk::{pubkey::Pubkey, signature::Keypair};

const SECTION: &str = "Global";

/// Contents of `client_config.ini`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub http_url: String,
    /// Base URL of the rewards API, e.g. `https://xessex.me`.
    pub api_url: String,
    pub payer_path: String,
    pub xess_claim_program: Pubkey,
    pub commitment: String,
    pub confirm_timeout: Duration,
    /// Sent verbatim as the `Cookie` header to the rewards API.
    pub session_cookie: Option<String>,
}

pub fn load_cfg(client_config: &str) -> Result<ClientConfig> {
    let mut config = Ini::new();
    config
        .load(client_config)
        .map_err(|e| format_err!("failed to load {}: {}", client_config, e))?;
    from_ini(&config)
}

pub fn from_ini(config: &Ini) -> Result<ClientConfig> {
    let http_url = required(config, "http_url")?;
    let api_url = required(config, "api_url")?;
    let payer_path = required(config, "payer_path")?;

    let xess_claim_program = match config.get(SECTION, "xess_claim_program") {
        Some(program) if !program.is_empty() => Pubkey::from_str(&program)
            .map_err(|e| format_err!("xess_claim_program {:?}: {}", program, e))?,
        _ => xess_claim::ID,
    };
    let commitment = config
        .get(SECTION, "commitment")
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "confirmed".to_string());
    let confirm_timeout_secs = config
        .getuint(SECTION, "confirm_timeout_secs")
        .map_err(|e| format_err!("confirm_timeout_secs: {}", e))?
        .unwrap_or(60);
    if confirm_timeout_secs == 0 {
        return Err(format_err!("confirm_timeout_secs must be positive"));
    }
    let session_cookie = config
        .get(SECTION, "session_cookie")
        .filter(|c| !c.is_empty());

    Ok(ClientConfig {
        http_url,
        api_url,
        payer_path,
        xess_claim_program,
        commitment,
        confirm_timeout: Duration::from_secs(confirm_timeout_secs),
        session_cookie,
    })
}

fn required(config: &Ini, key: &str) -> Result<String> {
    match config.get(SECTION, key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format_err!("{} must not be empty", key)),
    }
}

pub fn read_keypair_file(s: &str) -> Result<Keypair> {
    solana_sdk::signature::read_keypair_file(s)
        .map_err(|_| format_err!("failed to read keypair from {}", s))
}
