//! Demonstration server: exposes two in-memory capabilities over HTTP.
//!
//! ```text
//! GET  /api/Kulup/GetAll
//! GET  /api/Kulup/GetById?id=1
//! POST /api/Kulup/Create        {"name": "...", "city": "...", "founded": 1905}
//! GET  /api/Kulup/Search?city=Istanbul
//! GET  /api/Weather/Today?city=Izmir&unit=fahrenheit
//! POST /api/Weather/Refresh
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use dynapi_core::{
    Args, BindingConfig, Capability, CapabilityCatalog, EnumType, Invocation, MethodDecl,
    ObjectType, OperationError, ParamType, ReturnShape, TypeDecl, Variant,
};
use dynapi_server::{ApiServer, NetworkConfig, RouteCompiler};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "dynapi-demo", about = "Serves in-memory capabilities over HTTP")]
struct Cli {
    /// Bind address.
    #[arg(long, env = "DYNAPI_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Listen port; 0 picks a free one.
    #[arg(long, env = "DYNAPI_PORT", default_value_t = 8080)]
    port: u16,

    /// Prefix for every route.
    #[arg(long, env = "DYNAPI_BASE_ROUTE", default_value = "/api")]
    base_route: String,

    /// Allowed CORS origins, comma separated.
    #[arg(long, env = "DYNAPI_CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    cors_origins: Vec<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "DYNAPI_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    /// Largest JSON body accepted by the binder, in bytes.
    #[arg(long, env = "DYNAPI_MAX_BODY_BYTES", default_value_t = dynapi_core::config::DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,

    #[arg(long, env = "DYNAPI_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Cli {
    fn network_config(&self) -> NetworkConfig {
        let defaults = NetworkConfig::default();
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            base_route: self.base_route.clone(),
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_request_bytes: defaults.max_request_bytes.max(self.max_body_bytes),
            binding: BindingConfig {
                max_body_bytes: self.max_body_bytes,
                ..BindingConfig::default()
            },
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

// ---------------------------------------------------------------------------
// Kulup directory
// ---------------------------------------------------------------------------

const KULUP: ObjectType = ObjectType::concrete("Kulup", &["id", "name", "city", "founded"]);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Kulup {
    #[serde(default)]
    id: i32,
    name: String,
    city: Option<String>,
    founded: Option<i32>,
}

struct KulupDirectory {
    clubs: RwLock<Vec<Kulup>>,
}

impl KulupDirectory {
    fn seeded() -> Self {
        let seed = [
            ("Galatasaray", "Istanbul", 1905),
            ("Fenerbahce", "Istanbul", 1907),
            ("Besiktas", "Istanbul", 1903),
            ("Goztepe", "Izmir", 1925),
        ];
        let clubs = (1..)
            .zip(seed)
            .map(|(id, (name, city, founded))| Kulup {
                id,
                name: name.to_string(),
                city: Some(city.to_string()),
                founded: Some(founded),
            })
            .collect();
        Self {
            clubs: RwLock::new(clubs),
        }
    }
}

impl Capability for KulupDirectory {
    fn declaration() -> TypeDecl {
        TypeDecl::capability("IKulupClient")
            .method(MethodDecl::get("GetAll").returns(ReturnShape::DeferredValue))
            .method(
                MethodDecl::get("GetById")
                    .param("id", ParamType::Int32)
                    .returns(ReturnShape::DeferredValue),
            )
            .method(
                MethodDecl::post("Create")
                    .body("kulup", ParamType::Object(KULUP))
                    .returns(ReturnShape::DeferredValue),
            )
            .method(
                MethodDecl::get("Search")
                    .param("city", ParamType::Text)
                    .param("foundedBefore", ParamType::nullable(ParamType::Int32))
                    .returns(ReturnShape::DeferredValue),
            )
            .method(MethodDecl::unrouted("Dispose"))
    }

    fn invoke(&self, operation: &str, args: Args) -> Result<Invocation<'_>, OperationError> {
        match operation {
            "GetAll" => Ok(Invocation::deferred_value(async {
                Ok::<_, OperationError>(self.clubs.read().await.clone())
            })),
            "GetById" => {
                let id = args.take::<i32>(0)?;
                Ok(Invocation::deferred_value(async move {
                    let clubs = self.clubs.read().await;
                    Ok::<_, OperationError>(clubs.iter().find(|k| k.id == id).cloned())
                }))
            }
            "Create" => {
                let Some(mut kulup) = args.body::<Kulup>(0)? else {
                    return Err(anyhow::anyhow!("request body is required").into());
                };
                Ok(Invocation::deferred_value(async move {
                    let mut clubs = self.clubs.write().await;
                    kulup.id = clubs.iter().map(|k| k.id).max().unwrap_or(0) + 1;
                    clubs.push(kulup.clone());
                    info!(id = kulup.id, name = %kulup.name, "kulup created");
                    Ok::<_, OperationError>(kulup)
                }))
            }
            "Search" => {
                let city = args.take::<Option<String>>(0)?;
                let founded_before = args.take::<Option<i32>>(1)?;
                Ok(Invocation::deferred_value(async move {
                    let clubs = self.clubs.read().await;
                    let hits: Vec<Kulup> = clubs
                        .iter()
                        .filter(|k| match (&city, &k.city) {
                            (Some(wanted), Some(actual)) => actual.eq_ignore_ascii_case(wanted),
                            (Some(_), None) => false,
                            (None, _) => true,
                        })
                        .filter(|k| match (founded_before, k.founded) {
                            (Some(limit), Some(year)) => year < limit,
                            (Some(_), None) => false,
                            (None, _) => true,
                        })
                        .cloned()
                        .collect();
                    Ok::<_, OperationError>(hits)
                }))
            }
            other => Err(OperationError::UnknownOperation {
                name: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Weather station
// ---------------------------------------------------------------------------

const UNIT: EnumType = EnumType {
    name: "Unit",
    variants: &["Celsius", "Fahrenheit"],
};

#[derive(Default)]
struct WeatherStation {
    refreshes: AtomicU64,
}

impl Capability for WeatherStation {
    fn declaration() -> TypeDecl {
        TypeDecl::capability("IWeatherApi")
            .method(
                MethodDecl::get("Today")
                    .param("city", ParamType::Text)
                    .param("unit", ParamType::Enum(UNIT))
                    .returns(ReturnShape::Value),
            )
            .method(MethodDecl::post("Refresh").returns(ReturnShape::Deferred))
    }

    fn invoke(&self, operation: &str, args: Args) -> Result<Invocation<'_>, OperationError> {
        match operation {
            "Today" => {
                let city = args.take::<Option<String>>(0)?.unwrap_or_default();
                let unit = args.take::<Variant>(1)?;
                // Deterministic pseudo-reading so repeated calls agree.
                let seed = city.bytes().map(i32::from).sum::<i32>();
                let celsius = 10 + seed.rem_euclid(20);
                let temperature = if unit.0 == "Fahrenheit" {
                    celsius * 9 / 5 + 32
                } else {
                    celsius
                };
                Invocation::value(&json!({
                    "city": city,
                    "unit": unit.0,
                    "temperature": temperature,
                    "refreshes": self.refreshes.load(Ordering::Relaxed),
                }))
            }
            "Refresh" => Ok(Invocation::deferred(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                self.refreshes.fetch_add(1, Ordering::Relaxed);
                Ok(())
            })),
            other => Err(OperationError::UnknownOperation {
                name: other.to_string(),
            }),
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = cli.network_config();

    let mut catalog = CapabilityCatalog::new();
    catalog
        .register_instance(Arc::new(KulupDirectory::seeded()))
        .register_instance(Arc::new(WeatherStation::default()));

    let mut compiler = RouteCompiler::new(&config.base_route, config.binding.clone())?;
    compiler.map_all(&catalog)?;
    let (table, router) = compiler.into_parts();
    info!(routes = table.len(), "routes compiled");

    let mut server = ApiServer::new(config, router);
    let port = server.start().await?;
    info!(port, "dynapi demo listening");

    server.serve(shutdown_signal()).await
}
