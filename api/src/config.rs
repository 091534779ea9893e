use clap::Parser;
use jsonwebtoken::{Algorithm, DecodingKey};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

#[derive(Clone, Debug, Parser)]
pub struct CertAdmApiConfig {
    #[clap(
        short,
        long,
        env = "CERTADM_API_BIND_ADDR",
        default_value = "0.0.0.0:4000"
    )]
    pub bind_addr: SocketAddr,

    #[clap(
        long,
        env = "CERTADM_API_PUBLIC_URL",
        default_value = "http://localhost:4000"
    )]
    pub public_url: String,

    #[clap(long, default_value_t = false)]
    pub dump_openapi: bool,

    #[clap(
        long,
        env = "CERTADM_API_MONGODB_URI",
        default_value = "mongodb://localhost:27017/certadm"
    )]
    pub mongodb_uri: String,

    /// Ed25519 public key used to verify bearer tokens (PEM format).
    ///
    /// Tokens are expected to be signed with EdDSA by the issuing service.
    /// Takes precedence over `token_public_key_file` and `token_secret`.
    #[clap(long, env = "CERTADM_API_TOKEN_PUBLIC_KEY")]
    pub token_public_key: Option<String>,

    /// Path to the Ed25519 public key used to verify bearer tokens.
    #[clap(long, env = "CERTADM_API_TOKEN_PUBLIC_KEY_FILE")]
    pub token_public_key_file: Option<PathBuf>,

    /// Shared secret for HS256-signed bearer tokens. Only consulted when no
    /// public key is configured.
    #[clap(long, env = "CERTADM_API_TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: Option<String>,

    /// Required `iss` claim of bearer tokens. Unset accepts any issuer.
    #[clap(long, env = "CERTADM_API_TOKEN_ISSUER")]
    pub token_issuer: Option<String>,

    /// Deadline applied to a request when the caller does not send
    /// `x-request-timeout-ms`.
    #[clap(
        long,
        env = "CERTADM_API_REQUEST_TIMEOUT_MS",
        default_value_t = 5_000
    )]
    pub request_timeout_ms: u64,

    /// Upper bound for caller-supplied deadlines.
    #[clap(
        long,
        env = "CERTADM_API_MAX_REQUEST_TIMEOUT_MS",
        default_value_t = 30_000
    )]
    pub max_request_timeout_ms: u64,
}

impl CertAdmApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn max_request_timeout(&self) -> Duration {
        Duration::from_millis(self.max_request_timeout_ms)
    }

    /// Get the bearer token verification key and its algorithm.
    ///
    /// Checks `token_public_key` first (inline PEM), then
    /// `token_public_key_file`, then falls back to the HS256 `token_secret`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - None of the three sources is configured
    /// - `token_public_key_file` path doesn't exist or can't be read
    /// - The configured PEM is not an Ed25519 public key
    pub fn token_verification_key(&self) -> anyhow::Result<(DecodingKey, Algorithm)> {
        let pem = if let Some(ref key) = self.token_public_key {
            Some(key.clone())
        } else if let Some(ref path) = self.token_public_key_file {
            Some(
                std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("failed to read token public key file: {}", e))?,
            )
        } else {
            None
        };

        if let Some(pem) = pem {
            let key = DecodingKey::from_ed_pem(pem.as_bytes())
                .map_err(|e| anyhow::anyhow!("invalid token public key: {}", e))?;
            return Ok((key, Algorithm::EdDSA));
        }

        if let Some(ref secret) = self.token_secret {
            return Ok((DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256));
        }

        Err(anyhow::anyhow!(
            "no token verification key configured (set CERTADM_API_TOKEN_PUBLIC_KEY, CERTADM_API_TOKEN_PUBLIC_KEY_FILE or CERTADM_API_TOKEN_SECRET)"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CertAdmApiConfig {
        CertAdmApiConfig::parse_from(std::iter::once("certadm-api").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_apply() {
        let cfg = parse(&[]);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.max_request_timeout(), Duration::from_secs(30));
        assert!(!cfg.dump_openapi);
    }

    #[test]
    fn secret_selects_hs256() {
        let cfg = parse(&["--token-secret", "s3cret"]);
        let (_, alg) = cfg.token_verification_key().unwrap();
        assert_eq!(alg, Algorithm::HS256);
    }

    #[test]
    fn missing_key_is_an_error() {
        let cfg = parse(&[]);
        assert!(cfg.token_verification_key().is_err());
    }

    #[test]
    fn garbage_public_key_is_an_error() {
        let cfg = parse(&["--token-public-key", "not a pem", "--token-secret", "s3cret"]);
        assert!(cfg.token_verification_key().is_err());
    }

    #[test]
    fn unreadable_key_file_is_an_error() {
        let cfg = parse(&["--token-public-key-file", "/nonexistent/certadm/key.pem"]);
        assert!(cfg.token_verification_key().is_err());
    }
}
