use anyhow::{Context, Result, bail};
use axum::http::HeaderValue;
use clap::Parser;
use secrecy::SecretString;
use std::{env, str::FromStr, time::Duration};

/// The single browser origin allowed to call the gateway unless overridden.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://secure-s3-frontend-ipeb.vercel.app";

/// S3 refuses presigned URLs valid for more than seven days.
const MAX_PRESIGN_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Default tracing filter; `RUST_LOG` still wins when set.
    pub log_level: String,
    pub allowed_origin: HeaderValue,
    pub presign_expiry: Duration,
    pub s3: S3Config,
}

/// Connection settings for the storage backend.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    pub region: String,
    pub bucket: String,
    /// Custom endpoint for S3-compatible services (MinIO, RustFS, ...).
    pub endpoint_url: Option<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Folder-style HTTP gateway over S3 object storage")]
pub struct Args {
    /// Host to bind to (overrides GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Bucket region (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Bucket holding every user's folders (overrides S3_BUCKET_NAME)
    #[arg(long)]
    pub bucket: Option<String>,

    /// S3-compatible endpoint (overrides S3_ENDPOINT_URL)
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Browser origin allowed by CORS (overrides CORS_ALLOWED_ORIGIN)
    #[arg(long)]
    pub allowed_origin: Option<String>,

    /// Validity of upload/download URLs in seconds (overrides PRESIGN_EXPIRY_SECS)
    #[arg(long)]
    pub presign_expiry_secs: Option<u64>,

    /// Log filter used when RUST_LOG is unset, e.g. `debug` or `folder_gateway=trace`
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    ///
    /// Fails with one message listing every missing required variable.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_sources(Args::parse(), |name| env::var(name))
    }

    fn from_sources<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let read = |name: &str| -> Result<Option<String>> {
            match lookup(name) {
                Ok(value) if value.trim().is_empty() => Ok(None),
                Ok(value) => Ok(Some(value)),
                Err(env::VarError::NotPresent) => Ok(None),
                Err(err) => Err(err).with_context(|| format!("reading {name}")),
            }
        };

        // --- Required backend settings ---
        let access_key_id = read("AWS_ACCESS_KEY_ID")?;
        let secret_access_key = read("AWS_SECRET_ACCESS_KEY")?;
        let region = match args.region {
            Some(region) => Some(region),
            None => read("AWS_REGION")?,
        };
        let bucket = match args.bucket {
            Some(bucket) => Some(bucket),
            None => read("S3_BUCKET_NAME")?,
        };

        let required = [
            ("AWS_ACCESS_KEY_ID", access_key_id.is_none()),
            ("AWS_SECRET_ACCESS_KEY", secret_access_key.is_none()),
            ("AWS_REGION", region.is_none()),
            ("S3_BUCKET_NAME", bucket.is_none()),
        ];
        let missing: Vec<&str> = required
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
        let (Some(access_key_id), Some(secret_access_key), Some(region), Some(bucket)) =
            (access_key_id, secret_access_key, region, bucket)
        else {
            bail!("missing required configuration: {}", missing.join(", "));
        };

        // --- Optional settings with defaults ---
        let port = match args.port {
            Some(port) => port,
            None => parse_or(read("PORT")?, "PORT", 5000)?,
        };
        let expiry_secs = match args.presign_expiry_secs {
            Some(secs) => secs,
            None => parse_or(read("PRESIGN_EXPIRY_SECS")?, "PRESIGN_EXPIRY_SECS", 60)?,
        };
        if expiry_secs == 0 || expiry_secs > MAX_PRESIGN_EXPIRY_SECS {
            bail!("PRESIGN_EXPIRY_SECS must be between 1 and {MAX_PRESIGN_EXPIRY_SECS}, got {expiry_secs}");
        }

        let origin = match args.allowed_origin {
            Some(origin) => origin,
            None => read("CORS_ALLOWED_ORIGIN")?.unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.into()),
        };
        let allowed_origin = HeaderValue::from_str(&origin)
            .with_context(|| format!("CORS_ALLOWED_ORIGIN `{origin}` is not a valid header value"))?;

        Ok(Self {
            host: match args.host {
                Some(host) => host,
                None => read("GATEWAY_HOST")?.unwrap_or_else(|| "0.0.0.0".into()),
            },
            port,
            log_level: args.log_level,
            allowed_origin,
            presign_expiry: Duration::from_secs(expiry_secs),
            s3: S3Config {
                access_key_id,
                secret_access_key: SecretString::from(secret_access_key),
                region,
                bucket,
                endpoint_url: match args.endpoint_url {
                    Some(url) => Some(url),
                    None => read("S3_ENDPOINT_URL")?,
                },
            },
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(value: Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("parsing {name} value `{value}`")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn load(args: Args, vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_sources(args, move |name| {
            vars.get(name).cloned().ok_or(env::VarError::NotPresent)
        })
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
        ("AWS_SECRET_ACCESS_KEY", "very-secret"),
        ("AWS_REGION", "eu-west-1"),
        ("S3_BUCKET_NAME", "folders"),
    ];

    #[test]
    fn applies_defaults() {
        let cfg = load(Args::default(), &REQUIRED).unwrap();

        assert_eq!(cfg.addr(), "0.0.0.0:5000");
        assert_eq!(cfg.presign_expiry, Duration::from_secs(60));
        assert_eq!(cfg.allowed_origin, DEFAULT_ALLOWED_ORIGIN);
        assert_eq!(cfg.s3.region, "eu-west-1");
        assert_eq!(cfg.s3.bucket, "folders");
        assert_eq!(cfg.s3.endpoint_url, None);
        assert_eq!(cfg.s3.secret_access_key.expose_secret(), "very-secret");
    }

    #[test]
    fn reports_every_missing_variable() {
        let err = load(Args::default(), &[("AWS_REGION", "eu-west-1"), ("S3_BUCKET_NAME", "  ")])
            .unwrap_err()
            .to_string();

        assert_eq!(
            err,
            "missing required configuration: AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, S3_BUCKET_NAME"
        );
    }

    #[test]
    fn cli_arguments_override_environment() {
        let args = Args {
            port: Some(8080),
            bucket: Some("cli-bucket".into()),
            allowed_origin: Some("http://localhost:3000".into()),
            ..Args::default()
        };
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "9000"));
        vars.push(("CORS_ALLOWED_ORIGIN", "https://ignored.example"));
        let cfg = load(args, &vars).unwrap();

        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.s3.bucket, "cli-bucket");
        assert_eq!(cfg.allowed_origin, "http://localhost:3000");
    }

    #[test]
    fn reads_optional_environment() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "7000"));
        vars.push(("PRESIGN_EXPIRY_SECS", "120"));
        vars.push(("S3_ENDPOINT_URL", "http://localhost:9000"));
        let cfg = load(Args::default(), &vars).unwrap();

        assert_eq!(cfg.port, 7000);
        assert_eq!(cfg.presign_expiry, Duration::from_secs(120));
        assert_eq!(cfg.s3.endpoint_url.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn rejects_bad_numbers_and_expiry() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "http"));
        let err = load(Args::default(), &vars).unwrap_err();
        assert!(err.to_string().contains("PORT"), "{err}");

        let mut vars = REQUIRED.to_vec();
        vars.push(("PRESIGN_EXPIRY_SECS", "0"));
        assert!(load(Args::default(), &vars).is_err());

        let mut vars = REQUIRED.to_vec();
        vars.push(("PRESIGN_EXPIRY_SECS", "604801"));
        assert!(load(Args::default(), &vars).is_err());
    }

    #[test]
    fn secret_is_redacted_in_debug_output() {
        let cfg = load(Args::default(), &REQUIRED).unwrap();
        assert!(!format!("{cfg:?}").contains("very-secret"));
    }
}
