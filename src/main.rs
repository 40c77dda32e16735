use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use storefront::catalog::Catalog;
use storefront::config::{Cli, Command};
use storefront::jwt::{JwtVerifier, TokenIssuer};
use storefront::{Server, app, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.config.log);

    let config = cli.config;
    config.validate()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let verifier = JwtVerifier::new(config.jwt_secret.as_bytes(), &config.jwt_issuer);
            let app = app::router(Catalog::new(), Arc::new(verifier));

            info!(issuer = %config.jwt_issuer, "starting storefront");
            Server::bind(config.bind_addr()?).serve(app).await?;
        }
        Command::Token { sub, name } => {
            let issuer = TokenIssuer::new(config.jwt_secret.as_bytes(), &config.jwt_issuer, config.token_ttl()?);
            println!("{}", issuer.issue(&sub, name.as_deref())?);
        }
    }
    Ok(())
}
