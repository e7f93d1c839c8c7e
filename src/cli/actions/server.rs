use crate::auth;
use crate::auth::{
    gate::{GateConfig, HeaderSession},
    service::IssuerConfig,
};
use crate::cli::actions::Action;
use anyhow::Result;
use std::sync::Arc;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            consumer_key,
            consumer_secret,
            consumer_ttl,
            static_dir,
            login_url,
            session_header,
            disable_auth,
        } => {
            let issuer = IssuerConfig {
                consumer_key,
                consumer_secret,
                ttl: consumer_ttl,
            };

            let gate = GateConfig {
                disabled: disable_auth,
                login_url,
            };

            let sessions = Arc::new(HeaderSession::new(session_header));

            auth::new(port, issuer, gate, sessions, static_dir).await?;
        }
    }

    Ok(())
}
