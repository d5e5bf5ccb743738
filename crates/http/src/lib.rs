//! HTTP client factory used by every network call in the workspace.
//!
//! The achievement sources fingerprint TLS handshakes and block generic
//! automated clients, so [`browser_client`] pins the cipher-suite and
//! key-exchange ordering of Safari 15.5 (restricted to what rustls
//! supports) on top of a matching header set. [`plain_client`] is the
//! lighter variant used for plain file downloads that only check the
//! user agent.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use rustls::crypto::CryptoProvider;
use rustls::crypto::ring;
use rustls::{CipherSuite, ClientConfig, RootCertStore, SupportedCipherSuite};

/// User agent presented on every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.5 Safari/605.1.15";

/// Timeout applied to every page and image fetch, and to connection
/// establishment for archive downloads.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Safari 15.5 cipher-suite preference, in handshake order.
///
/// The CBC, 3DES and static-RSA entries of the real handshake have no
/// rustls equivalent and are omitted; the sites accept the remaining
/// AEAD prefix.
const SAFARI_CIPHER_SUITES: &[CipherSuite] = &[
    CipherSuite::TLS13_AES_128_GCM_SHA256,
    CipherSuite::TLS13_AES_256_GCM_SHA384,
    CipherSuite::TLS13_CHACHA20_POLY1305_SHA256,
    CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
    CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
    CipherSuite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
    CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
];

/// Errors from client construction.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Builds the browser-impersonating client used for page and image fetches.
pub fn browser_client() -> Result<reqwest::Client, HttpError> {
    let client = reqwest::Client::builder()
        .default_headers(browser_headers())
        .use_preconfigured_tls(safari_tls_config()?)
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Builds a plain client carrying only the browser user agent.
///
/// Used for the emulator release archive, which is served without
/// handshake fingerprinting. Only connecting is bounded: the archive
/// is large and a slow link legitimately needs more than the
/// page-fetch deadline for the body.
pub fn plain_client() -> Result<reqwest::Client, HttpError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Fixed header set matching the impersonated browser.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-GB,en-US;q=0.9,en;q=0.8"),
    );
    // Accept-Encoding is advertised by reqwest itself so response
    // bodies are decompressed transparently.
    headers
}

/// Builds the rustls config with Safari's suite and curve ordering.
fn safari_tls_config() -> Result<ClientConfig, rustls::Error> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder_with_provider(Arc::new(safari_provider()))
        .with_protocol_versions(&[&rustls::version::TLS13, &rustls::version::TLS12])?
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(config)
}

/// Crypto provider restricted and reordered to the Safari profile.
///
/// Key exchange is pinned to X25519, P-256, P-384; P-521 from the real
/// handshake is not available in ring.
fn safari_provider() -> CryptoProvider {
    let base = ring::default_provider();

    let cipher_suites: Vec<SupportedCipherSuite> = SAFARI_CIPHER_SUITES
        .iter()
        .filter_map(|id| base.cipher_suites.iter().copied().find(|s| s.suite() == *id))
        .collect();

    CryptoProvider {
        cipher_suites,
        kx_groups: vec![
            ring::kx_group::X25519,
            ring::kx_group::SECP256R1,
            ring::kx_group::SECP384R1,
        ],
        ..base
    }
}
