mod run;

use crate::tls::FetchOptions;
use std::str::FromStr;

/// How fetched certificates are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Every certificate field as pretty-printed JSON
    #[default]
    Json,
    /// The PEM-encoded certificate only
    Pem,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pem" => Ok(Self::Pem),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

/// Action enum representing each possible command
#[derive(Debug)]
pub enum Action {
    Fetch {
        hosts: Vec<String>,
        options: FetchOptions,
        format: OutputFormat,
    },
}

impl Action {
    /// Execute the action
    ///
    /// # Errors
    ///
    /// Returns an error if any host could not be fetched
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
