use super::{Action, OutputFormat};
use crate::tls::{self, Certificate, FetchOptions};
use anyhow::{Context, Result, bail};
use futures::future::join_all;
use tracing::info;

/// Execute the action's business logic by delegating to the appropriate module
///
/// # Errors
///
/// Returns an error if any host could not be fetched or rendered
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Fetch {
            hosts,
            options,
            format,
        } => fetch_all(&hosts, &options, format).await,
    }
}

/// Fetch every host concurrently, print successes to stdout and failures to stderr
async fn fetch_all(hosts: &[String], options: &FetchOptions, format: OutputFormat) -> Result<()> {
    let results = join_all(hosts.iter().map(|host| fetch_one(host, options.clone()))).await;

    let mut failures = 0;
    for (host, result) in hosts.iter().zip(results) {
        match result {
            Ok(certificate) => {
                info!(host = %host, "certificate fetched");
                println!("{}", render(&certificate, format)?);
            }
            Err(e) => {
                failures += 1;
                eprintln!("{host}: {e}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} host(s) failed", hosts.len());
    }

    Ok(())
}

async fn fetch_one(host: &str, options: FetchOptions) -> crate::Result<Certificate> {
    tls::fetch(host, options)?.await
}

fn render(certificate: &Certificate, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(certificate).context("failed to serialize certificate")
        }
        OutputFormat::Pem => certificate
            .pem_encoded
            .clone()
            .context("certificate has no DER bytes to encode"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::pem;

    fn sample() -> Certificate {
        let raw = vec![0x30, 0x03, 0x02, 0x01, 0x01];
        Certificate {
            pem_encoded: Some(pem::encode_der(&raw)),
            raw: Some(raw),
            valid_to: Some("Aug 22 23:59:59 2017 GMT".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_pem() {
        let out = render(&sample(), OutputFormat::Pem).unwrap();
        assert!(out.starts_with(pem::PEM_HEADER));
        assert!(out.ends_with(pem::PEM_FOOTER));
    }

    #[test]
    fn test_render_pem_without_raw() {
        let certificate = Certificate {
            valid_to: Some("Aug 22 23:59:59 2017 GMT".to_string()),
            ..Default::default()
        };
        assert!(render(&certificate, OutputFormat::Pem).is_err());
    }

    #[test]
    fn test_render_json() {
        let out = render(&sample(), OutputFormat::Json).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["valid_to"], "Aug 22 23:59:59 2017 GMT");
        assert_eq!(json["raw"], "MAMCAQE=");
        assert!(json["pemEncoded"].as_str().unwrap().contains("MAMCAQE="));
    }
}
