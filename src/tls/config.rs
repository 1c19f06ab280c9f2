use std::{fmt, str::FromStr, time::Duration};

/// Options for a single certificate fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Abort the attempt if the handshake has not completed within this window
    pub timeout: Option<Duration>,
    /// TCP port, defaults to the scheme's well-known port
    pub port: Option<u16>,
    pub scheme: Scheme,
}

impl FetchOptions {
    /// Port to connect to, falling back to the scheme default
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.scheme.default_port())
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub const fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }
}

/// Implicit-TLS schemes, the handshake starts as soon as TCP connects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Https,
    Ldaps,
    Ftps,
    Imaps,
    Pop3s,
    Smtps,
}

impl Scheme {
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Https => 443,
            Self::Ldaps => 636,
            Self::Ftps => 990,
            Self::Imaps => 993,
            Self::Pop3s => 995,
            Self::Smtps => 465,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Https => "https",
            Self::Ldaps => "ldaps",
            Self::Ftps => "ftps",
            Self::Imaps => "imaps",
            Self::Pop3s => "pop3s",
            Self::Smtps => "smtps",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = String;

    /// Case-insensitive, a trailing `:` is accepted (`https:`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_end_matches(':');
        match name.to_lowercase().as_str() {
            "https" => Ok(Self::Https),
            "ldaps" => Ok(Self::Ldaps),
            "ftps" => Ok(Self::Ftps),
            "imaps" => Ok(Self::Imaps),
            "pop3s" => Ok(Self::Pop3s),
            "smtps" => Ok(Self::Smtps),
            _ => Err(format!("Invalid scheme: {s}")),
        }
    }
}
