use crate::cli::actions::Action;
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        consumer_key: matches
            .get_one::<String>("consumer-key")
            .map(String::to_string)
            .context("missing required argument: --consumer-key")?,
        consumer_secret: matches
            .get_one::<String>("consumer-secret")
            .map(|s| SecretString::from(s.clone()))
            .context("missing required argument: --consumer-secret")?,
        consumer_ttl: matches
            .get_one::<i64>("consumer-ttl")
            .copied()
            .unwrap_or(86400),
        static_dir: matches
            .get_one::<PathBuf>("static-dir")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("build")),
        login_url: matches
            .get_one::<String>("login-url")
            .map(String::to_string)
            .context("missing required argument: --login-url")?,
        session_header: matches
            .get_one::<String>("session-header")
            .map(String::to_string)
            .context("missing required argument: --session-header")?,
        disable_auth: matches.get_flag("disable-auth"),
    })
}
