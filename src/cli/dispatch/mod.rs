use crate::{
    cli::actions::{Action, OutputFormat},
    tls::{FetchOptions, Scheme},
};
use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use std::time::Duration;

/// Convert `ArgMatches` into typed Action enum with validation
///
/// # Errors
///
/// Returns an error if no host is given or an option value is invalid
pub fn dispatch(matches: &ArgMatches) -> Result<Action> {
    let hosts: Vec<String> = matches
        .get_many::<String>("host")
        .context("at least one host is required")?
        .cloned()
        .collect();

    let scheme = matches
        .get_one::<String>("scheme")
        .map(|s| s.parse::<Scheme>().map_err(|e| anyhow!(e)))
        .transpose()?
        .unwrap_or_default();

    let options = FetchOptions {
        timeout: matches
            .get_one::<u64>("timeout")
            .map(|ms| Duration::from_millis(*ms)),
        port: matches.get_one::<u16>("port").copied(),
        scheme,
    };

    let format = matches
        .get_one::<String>("format")
        .map(|f| f.parse::<OutputFormat>().map_err(|e| anyhow!(e)))
        .transpose()?
        .unwrap_or_default();

    Ok(Action::Fetch {
        hosts,
        options,
        format,
    })
}
