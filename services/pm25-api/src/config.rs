//! Service configuration.
//!
//! Every setting comes from a command-line flag or its environment variable
//! (a `.env` file is loaded first). [`AppConfig`] is built once at startup
//! and handed to the components that need it.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use pm25_common::{Pm25Error, Pm25Result};
use satellite::EarthEngineConfig;
use storage::{ObjectStorageConfig, StorageBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    Gcs,
    S3,
    Local,
    Memory,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "pm25-api")]
#[command(about = "PM2.5 prediction map service")]
pub struct Args {
    /// Service-account identity used for storage and Earth Engine
    #[arg(long, env = "SERVICE_ACCOUNT")]
    pub service_account: Option<String>,

    /// Service-account credentials file
    #[arg(long, env = "SERVICE_FILE")]
    pub service_file: Option<PathBuf>,

    /// Cloud project owning the exports
    #[arg(long, env = "PROJECT_NAME")]
    pub project_name: Option<String>,

    /// Bucket holding source rasters and rendered maps
    #[arg(long, env = "BUCKET_NAME")]
    pub bucket_name: Option<String>,

    /// Model artifact (JSON)
    #[arg(long, env = "PM25_MODEL")]
    pub model: Option<PathBuf>,

    #[arg(long, env = "STORAGE_BACKEND", value_enum, default_value = "gcs")]
    pub storage_backend: BackendKind,

    /// Root directory for the `local` backend
    #[arg(long, env = "STORAGE_ROOT")]
    pub storage_root: Option<PathBuf>,

    #[arg(long, env = "S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    #[arg(long, env = "S3_REGION", default_value = "us-east-1")]
    pub s3_region: String,

    #[arg(long, env = "S3_ALLOW_HTTP", default_value_t = false)]
    pub s3_allow_http: bool,

    /// Base of public object URLs
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = "https://storage.googleapis.com")]
    pub public_base_url: String,

    /// Earth Engine OAuth2 bearer token; exports are only logged without it
    #[arg(long, env = "EE_ACCESS_TOKEN", hide_env_values = true)]
    pub ee_access_token: Option<String>,

    #[arg(long, env = "EE_API_URL", default_value = "https://earthengine.googleapis.com")]
    pub ee_api_url: String,

    /// Earth Engine request timeout in seconds
    #[arg(long, env = "EE_TIMEOUT_SECS", default_value_t = 60)]
    pub ee_timeout_secs: u64,

    /// Scratch directory for downloaded and merged rasters
    #[arg(long, env = "WORK_DIR", default_value = "tmp")]
    pub work_dir: PathBuf,

    /// Directory the rendered map is written to before upload
    #[arg(long, env = "OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// How long to wait for a triggered export to land (0 = don't wait)
    #[arg(long, env = "EXPORT_WAIT_SECS", default_value_t = 0)]
    pub export_wait_secs: u64,

    #[arg(long, env = "EXPORT_POLL_SECS", default_value_t = 15)]
    pub export_poll_secs: u64,

    /// Integer upscale factor of the rendered PNG
    #[arg(long, env = "MAP_SCALE", default_value_t = 1)]
    pub map_scale: usize,

    #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    pub listen: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Settings for one map generation run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub work_dir: PathBuf,
    pub output_dir: PathBuf,
    pub public_base_url: String,
    pub export_wait: Duration,
    pub export_poll: Duration,
    pub map_scale: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("tmp"),
            output_dir: PathBuf::from("output"),
            public_base_url: "https://storage.googleapis.com".to_string(),
            export_wait: Duration::ZERO,
            export_poll: Duration::from_secs(15),
            map_scale: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub service_account: String,
    pub project: String,
    pub model_path: PathBuf,
    pub storage: ObjectStorageConfig,
    /// `None` when no access token is configured
    pub earth_engine: Option<EarthEngineConfig>,
    pub pipeline: PipelineConfig,
    pub listen_addr: SocketAddr,
}

fn required<T>(value: Option<T>, env: &str) -> Pm25Result<T> {
    value.ok_or_else(|| Pm25Error::ConfigError(format!("{} is not set", env)))
}

impl AppConfig {
    pub fn from_args(args: Args) -> Pm25Result<Self> {
        let service_account = required(args.service_account, "SERVICE_ACCOUNT")?;
        let service_file = required(args.service_file, "SERVICE_FILE")?;
        let project = required(args.project_name, "PROJECT_NAME")?;
        let bucket = required(args.bucket_name, "BUCKET_NAME")?;
        let model_path = required(args.model, "PM25_MODEL")?;

        let backend = match args.storage_backend {
            BackendKind::Gcs => StorageBackend::Gcs {
                service_account_path: service_file,
            },
            BackendKind::S3 => StorageBackend::S3 {
                endpoint: args.s3_endpoint,
                region: args.s3_region,
                allow_http: args.s3_allow_http,
            },
            BackendKind::Local => StorageBackend::Local {
                root: required(args.storage_root, "STORAGE_ROOT")?,
            },
            BackendKind::Memory => StorageBackend::Memory,
        };

        let earth_engine = args
            .ee_access_token
            .filter(|token| !token.trim().is_empty())
            .map(|access_token| EarthEngineConfig {
                api_url: args.ee_api_url.clone(),
                project: project.clone(),
                bucket: bucket.clone(),
                access_token,
                request_timeout: Duration::from_secs(args.ee_timeout_secs),
            });

        if args.map_scale == 0 {
            return Err(Pm25Error::ConfigError("MAP_SCALE must be at least 1".to_string()));
        }
        if args.export_wait_secs > 0 && args.export_poll_secs == 0 {
            return Err(Pm25Error::ConfigError(
                "EXPORT_POLL_SECS must be positive when EXPORT_WAIT_SECS is set".to_string(),
            ));
        }

        let listen_addr = args.listen.parse().map_err(|e| {
            Pm25Error::ConfigError(format!("Invalid LISTEN_ADDR '{}': {}", args.listen, e))
        })?;

        Ok(Self {
            service_account,
            project,
            model_path,
            storage: ObjectStorageConfig { bucket, backend },
            earth_engine,
            pipeline: PipelineConfig {
                work_dir: args.work_dir,
                output_dir: args.output_dir,
                public_base_url: args.public_base_url,
                export_wait: Duration::from_secs(args.export_wait_secs),
                export_poll: Duration::from_secs(args.export_poll_secs),
                map_scale: args.map_scale,
            },
            listen_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 11] = [
        "pm25-api",
        "--service-account",
        "svc@my-project.iam.gserviceaccount.com",
        "--service-file",
        "/secrets/key.json",
        "--project-name",
        "my-project",
        "--bucket-name",
        "my-bucket",
        "--model",
        "model.json",
    ];

    fn parse(extra: &[&str]) -> Pm25Result<AppConfig> {
        let argv: Vec<&str> = REQUIRED.iter().chain(extra).copied().collect();
        AppConfig::from_args(Args::parse_from(argv))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.storage.bucket, "my-bucket");
        assert_eq!(
            config.storage.backend,
            StorageBackend::Gcs {
                service_account_path: PathBuf::from("/secrets/key.json")
            }
        );
        assert_eq!(config.pipeline.work_dir, PathBuf::from("tmp"));
        assert_eq!(config.pipeline.export_wait, Duration::ZERO);
        assert_eq!(config.pipeline.map_scale, 1);
        assert_eq!(config.listen_addr.port(), 8000);
    }

    #[test]
    fn test_earth_engine_needs_token() {
        assert!(parse(&[]).unwrap().earth_engine.is_none());
        assert!(parse(&["--ee-access-token", " "]).unwrap().earth_engine.is_none());

        let ee = parse(&["--ee-access-token", "ya29.token"]).unwrap().earth_engine.unwrap();
        assert_eq!(ee.project, "my-project");
        assert_eq!(ee.bucket, "my-bucket");
    }

    #[test]
    fn test_missing_required() {
        let args = Args::parse_from(["pm25-api", "--bucket-name", "b"]);
        let err = AppConfig::from_args(args).unwrap_err();
        assert_eq!(err.kind(), "config");
        assert!(err.to_string().contains("SERVICE_ACCOUNT"));
    }

    #[test]
    fn test_local_backend_needs_root() {
        assert!(parse(&["--storage-backend", "local"]).is_err());
        let config = parse(&["--storage-backend", "local", "--storage-root", "/data"]).unwrap();
        assert_eq!(
            config.storage.backend,
            StorageBackend::Local {
                root: PathBuf::from("/data")
            }
        );
    }

    #[test]
    fn test_zero_scale_rejected() {
        assert!(parse(&["--map-scale", "0"]).is_err());
    }
}
