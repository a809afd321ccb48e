//! Terminal client for the résumé screening service.
//!
//! Signs in against the identity provider, then scores PDF résumés against
//! a job description through the scoring service.

use anyhow::{Context, Result};
use pico_args::Arguments;
use rs_client::api_client::ApiClient;
use rs_client::config::{ClientConfig, ConfigOverrides};
use rs_client::identity_client::IdentityClient;
use rs_client::logging;
use rs_client::shell::{Entry, Shell};
use std::sync::Arc;

const HELP: &str = "\
Screen PDF resumes against a job description

USAGE:
  rs_client [OPTIONS]

OPTIONS:
  --scoring-url URL       Scoring service URL  [default: http://127.0.0.1:8000]
  --identity-url URL      Identity provider URL  [env: SUPABASE_URL]
  --recovery-token TOKEN  Access token from a password-reset link

FLAGS:
  --recovery              Start at the sign-in screen so a reset link
                          session is recognized
  -h, --help              Print help information

ENVIRONMENT:
  SUPABASE_ANON_KEY, RESET_REDIRECT_URL, RESET_COOLDOWN_SECS,
  HTTP_TIMEOUT_SECS, RUST_LOG
";

struct Args {
    overrides: ConfigOverrides,
    recovery: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        overrides: ConfigOverrides {
            scoring_url: pargs.opt_value_from_str("--scoring-url")?,
            identity_url: pargs.opt_value_from_str("--identity-url")?,
            recovery_token: pargs.opt_value_from_str("--recovery-token")?,
        },
        recovery: pargs.contains("--recovery"),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {remaining:?}. See --help");
    }

    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    logging::init();

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let config = ClientConfig::from_env(args.overrides).context("Invalid configuration")?;

    let scoring = ApiClient::with_timeout(config.scoring.base_url.clone(), config.scoring.timeout)?;
    match scoring.ping().await {
        Ok(message) => tracing::info!(url = scoring.base_url(), %message, "scoring service reachable"),
        Err(e) => tracing::warn!(url = scoring.base_url(), error = %e, "scoring service not reachable yet"),
    }

    let mut identity = IdentityClient::new(
        config.identity.url,
        config.identity.anon_key,
        config.scoring.timeout,
    )?;
    let entry = match config.recovery_token {
        Some(token) => {
            identity = identity.with_recovery_token(token);
            Entry::SignIn
        }
        None if args.recovery => Entry::SignIn,
        None => Entry::Dashboard,
    };

    let mut shell = Shell::new(Arc::new(identity), Arc::new(scoring), config.session);
    shell.start(entry).await;

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    shell.run(stdin, tokio::io::stdout()).await
}
