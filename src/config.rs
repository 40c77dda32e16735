//! Command line and environment configuration.

use std::net::SocketAddr;

use chrono::Duration;
use clap::{Args, Parser, Subcommand};

use crate::error::Error;

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront REST backend")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "STOREFRONT_BIND", default_value = "0.0.0.0:9000")]
    pub bind: String,

    /// HS256 signing secret, at least 32 bytes
    #[arg(long, env = "STOREFRONT_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Expected `iss` claim
    #[arg(long, env = "STOREFRONT_JWT_ISSUER", default_value = "storefront")]
    pub jwt_issuer: String,

    /// Lifetime of tokens minted by `storefront token`
    #[arg(long, env = "STOREFRONT_TOKEN_TTL_MINUTES", default_value_t = 1440)]
    pub token_ttl_minutes: i64,

    /// Log filter directive, e.g. `info,storefront=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log: String,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Print a bearer token for a user id
    Token {
        /// User id (`sub` claim)
        #[arg(long)]
        sub: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,
    },
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(Error::Config(format!(
                "jwt secret must be at least {MIN_SECRET_LEN} bytes, got {}",
                self.jwt_secret.len()
            )));
        }
        self.token_ttl()?;
        self.bind_addr()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, Error> {
        self.bind.parse().map_err(|source| Error::Address { addr: self.bind.clone(), source })
    }

    pub fn token_ttl(&self) -> Result<Duration, Error> {
        if self.token_ttl_minutes <= 0 {
            return Err(Error::Config("token ttl must be positive".into()));
        }
        Duration::try_minutes(self.token_ttl_minutes).ok_or_else(|| {
            Error::Config(format!("token ttl of {} minutes is out of range", self.token_ttl_minutes))
        })
    }
}
