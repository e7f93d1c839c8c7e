use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("annotate-auth")
        .about("Authentication front-end and JWT issuer for the Annotator ecosystem")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("ANNOTATE_AUTH_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("consumer-key")
                .short('k')
                .long("consumer-key")
                .help("Consumer key embedded in issued tokens, shared with the annotation store")
                .default_value("annotateit")
                .env("CONSUMER_KEY"),
        )
        .arg(
            Arg::new("consumer-secret")
                .short('s')
                .long("consumer-secret")
                .help("Shared secret used to sign tokens, must match the verifying service")
                .env("CONSUMER_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("consumer-ttl")
                .short('t')
                .long("consumer-ttl")
                .help("Token lifetime in seconds")
                .default_value("86400")
                .env("CONSUMER_TTL")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new("static-dir")
                .long("static-dir")
                .help("Directory holding the single-page-app build to serve")
                .default_value("build")
                .env("ANNOTATE_AUTH_STATIC_DIR")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            Arg::new("login-url")
                .long("login-url")
                .help("Login page URL returned to unauthenticated token requests")
                .default_value("/user/sign-in")
                .env("ANNOTATE_AUTH_LOGIN_URL"),
        )
        .arg(
            Arg::new("session-header")
                .long("session-header")
                .help("Trusted header carrying the authenticated user id, set by the user-management front")
                .default_value("X-Auth-User")
                .env("ANNOTATE_AUTH_SESSION_HEADER"),
        )
        .arg(
            Arg::new("disable-auth")
                .long("disable-auth")
                .help("Skip the login gate, for test harnesses only")
                .env("ANNOTATE_AUTH_DISABLE_AUTH")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("ANNOTATE_AUTH_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
