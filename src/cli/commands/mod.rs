use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

/// Pure clap command definitions with zero business logic
#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .after_help(
            "WARNING: certificates are NOT verified. peercert shows what a server presents, \
            it does not tell you whether to trust it.",
        )
        .arg(
            Arg::new("host")
                .help("host name or IP address to fetch the certificate from")
                .num_args(1..)
                .required(true)
                .value_name("HOST"),
        )
        .arg(
            Arg::new("port")
                .env("PEERCERT_PORT")
                .help("TCP port (default: the scheme's port, 443 for https)")
                .long("port")
                .short('p')
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("scheme")
                .default_value("https")
                .env("PEERCERT_SCHEME")
                .help("implicit-TLS scheme, selects the default port")
                .long("scheme")
                .short('s')
                .value_parser(["https", "ldaps", "ftps", "imaps", "pop3s", "smtps"]),
        )
        .arg(
            Arg::new("timeout")
                .env("PEERCERT_TIMEOUT")
                .help("abort the handshake after this many milliseconds")
                .long("timeout")
                .short('t')
                .value_name("MS")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("format")
                .default_value("json")
                .env("PEERCERT_FORMAT")
                .help("output format")
                .long("format")
                .long_help(
                    "Output format:\n\n\
                    - json: all certificate fields, DER bytes as base64 in `raw`\n\
                    - pem: the PEM-encoded certificate only",
                )
                .short('f')
                .value_parser(["json", "pem"]),
        )
        .arg(
            Arg::new("verbose")
                .help("increase logging verbosity (-v, -vv, -vvv), RUST_LOG takes precedence")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count),
        )
}
