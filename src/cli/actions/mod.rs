pub mod server;

use secrecy::SecretString;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        consumer_key: String,
        consumer_secret: SecretString,
        consumer_ttl: i64,
        static_dir: PathBuf,
        login_url: String,
        session_header: String,
        disable_auth: bool,
    },
}
