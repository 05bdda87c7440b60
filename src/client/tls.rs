//! TLS trust policy applied to a single client's transport.

use reqwest::blocking::ClientBuilder;
use reqwest::tls::Version;
use tracing::warn;

/// How a client verifies HTTPS peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TlsPolicy {
    trust_all: bool,
    min_version: Option<Version>,
}

impl TlsPolicy {
    /// Builds the policy from the `ignore_https` flag and protocol name.
    ///
    /// Generic names (`TLS`, `SSL`, blank) and unknown names keep the
    /// transport default.
    #[must_use]
    pub fn new(trust_all: bool, protocol: &str) -> Self {
        Self {
            trust_all,
            min_version: min_version_for(protocol),
        }
    }

    /// True when any certificate and host name is accepted.
    #[must_use]
    pub fn trusts_all(&self) -> bool {
        self.trust_all
    }

    /// Minimum TLS version selected by the protocol name, if any.
    #[must_use]
    pub fn min_version(&self) -> Option<Version> {
        self.min_version
    }

    pub(crate) fn apply(self, mut builder: ClientBuilder) -> ClientBuilder {
        if self.trust_all {
            warn!("certificate verification disabled for this client");
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(version) = self.min_version {
            builder = builder.min_tls_version(version);
        }
        builder
    }
}

fn min_version_for(protocol: &str) -> Option<Version> {
    match protocol.trim().to_ascii_uppercase().as_str() {
        "TLSV1" | "TLSV1.0" => Some(Version::TLS_1_0),
        "TLSV1.1" => Some(Version::TLS_1_1),
        "TLSV1.2" => Some(Version::TLS_1_2),
        "TLSV1.3" => Some(Version::TLS_1_3),
        "" | "TLS" | "SSL" | "SSLV3" => None,
        other => {
            warn!(protocol = %other, "unrecognised HTTPS protocol name, using transport default");
            None
        }
    }
}
