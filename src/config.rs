use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::{env, fmt, str::FromStr};

/// Which object-store implementation backs the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Any S3-compatible API (AWS S3, Cloudflare R2, MinIO).
    S3,
    /// A plain directory on local disk.
    Local,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "s3" | "r2" => Ok(Backend::S3),
            "local" => Ok(Backend::Local),
            other => bail!("unknown backend `{}` (expected `s3` or `local`)", other),
        }
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: Backend,
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub account_id: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub force_path_style: bool,
    pub local_dir: String,
    pub public_url: String,
    pub page_cache_ttl_secs: u64,
    pub site_title: String,
    pub accent_color: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Browse an object-storage bucket and annotate its files")]
pub struct Args {
    /// Host to bind to (overrides BUCKET_NOTES_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BUCKET_NOTES_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Object store backend (overrides BUCKET_NOTES_BACKEND)
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Bucket name (overrides BUCKET_NOTES_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Region passed to the S3 client (overrides BUCKET_NOTES_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Custom S3 endpoint, e.g. a MinIO URL (overrides BUCKET_NOTES_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Cloudflare account id; derives the R2 endpoint when no endpoint is set
    #[arg(long)]
    pub account_id: Option<String>,

    /// Use path-style bucket addressing. BUCKET_NOTES_FORCE_PATH_STYLE accepts
    /// 1/true/yes/on or 0/false/no/off
    #[arg(long)]
    pub force_path_style: bool,

    /// Root directory for the local backend (overrides BUCKET_NOTES_LOCAL_DIR)
    #[arg(long)]
    pub local_dir: Option<String>,

    /// Public base URL objects are served from (overrides BUCKET_NOTES_PUBLIC_URL)
    #[arg(long)]
    pub public_url: Option<String>,

    /// Seconds a rendered page stays cached; 0 disables caching
    #[arg(long)]
    pub page_cache_ttl_secs: Option<u64>,

    /// Title shown in the page header (overrides BUCKET_NOTES_SITE_TITLE)
    #[arg(long)]
    pub site_title: Option<String>,

    /// CSS colour used for accents (overrides BUCKET_NOTES_ACCENT_COLOR)
    #[arg(long)]
    pub accent_color: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_args(Args::parse(), |name| env::var(name).ok())
    }

    /// Merge parsed CLI args over values looked up through `lookup`.
    ///
    /// CLI beats environment, environment beats defaults.
    pub fn from_args<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("BUCKET_NOTES_{}", suffix));

        let env_port = parse_var(&var("PORT"), "BUCKET_NOTES_PORT")?.unwrap_or(3000);
        let env_backend = parse_var(&var("BACKEND"), "BUCKET_NOTES_BACKEND")?
            .unwrap_or(Backend::S3);
        let env_ttl =
            parse_var(&var("PAGE_CACHE_TTL_SECS"), "BUCKET_NOTES_PAGE_CACHE_TTL_SECS")?
                .unwrap_or(30);
        let env_path_style = match var("FORCE_PATH_STYLE") {
            Some(raw) => parse_flag(&raw).with_context(|| {
                format!("parsing BUCKET_NOTES_FORCE_PATH_STYLE value `{}`", raw)
            })?,
            None => false,
        };

        let cfg = Self {
            host: args
                .host
                .or_else(|| var("HOST"))
                .unwrap_or_else(|| "0.0.0.0".into()),
            port: args.port.unwrap_or(env_port),
            backend: args.backend.unwrap_or(env_backend),
            bucket: args.bucket.or_else(|| var("BUCKET")).unwrap_or_default(),
            region: args
                .region
                .or_else(|| var("REGION"))
                .unwrap_or_else(|| "auto".into()),
            endpoint: non_empty(args.endpoint.or_else(|| var("ENDPOINT"))),
            account_id: non_empty(args.account_id.or_else(|| var("ACCOUNT_ID"))),
            access_key_id: non_empty(var("ACCESS_KEY_ID")),
            secret_access_key: non_empty(var("SECRET_ACCESS_KEY")),
            force_path_style: args.force_path_style || env_path_style,
            local_dir: args
                .local_dir
                .or_else(|| var("LOCAL_DIR"))
                .unwrap_or_else(|| "./data/bucket".into()),
            public_url: args
                .public_url
                .or_else(|| var("PUBLIC_URL"))
                .unwrap_or_default(),
            page_cache_ttl_secs: args.page_cache_ttl_secs.unwrap_or(env_ttl),
            site_title: args
                .site_title
                .or_else(|| var("SITE_TITLE"))
                .unwrap_or_else(|| "Bucket Notes".into()),
            accent_color: args
                .accent_color
                .or_else(|| var("ACCENT_COLOR"))
                .unwrap_or_else(|| "#1976d2".into()),
        };

        if cfg.backend == Backend::S3 && cfg.bucket.trim().is_empty() {
            bail!("the s3 backend requires a bucket (set BUCKET_NOTES_BUCKET or --bucket)");
        }

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Endpoint handed to the S3 client: an explicit endpoint wins, otherwise
    /// an account id resolves to its R2 endpoint.
    pub fn resolved_endpoint(&self) -> Option<String> {
        self.endpoint.clone().or_else(|| {
            self.account_id
                .as_ref()
                .map(|id| format!("https://{}.r2.cloudflarestorage.com", id))
        })
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("backend", &self.backend)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.resolved_endpoint())
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("force_path_style", &self.force_path_style)
            .field("local_dir", &self.local_dir)
            .field("public_url", &self.public_url)
            .field("page_cache_ttl_secs", &self.page_cache_ttl_secs)
            .field("site_title", &self.site_title)
            .finish()
    }
}

fn parse_var<T>(value: &Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| anyhow::anyhow!("{}", err))
            .with_context(|| format!("parsing {} value `{}`", name, raw)),
        None => Ok(None),
    }
}

/// Boolean env flag in any of the usual spellings; empty means false.
fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected one of 1/true/yes/on or 0/false/no/off, got `{}`", other),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
