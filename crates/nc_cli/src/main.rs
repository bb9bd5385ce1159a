use clap::{Parser, Subcommand};
use nc_core::{BlogStorage, Error, ImageStore, NewsSource, Result};
use nc_inference::{Config, InferenceConfig};
use nc_news::{BingConfig, BingNewsClient, PageFetcher, StaticNewsSource};
use nc_storage::{CloudinaryConfig, CloudinaryImageStore, MemoryImageStore};
use nc_web::handlers::{analyze_claim, AnalyzeRequest};
use nc_web::logging::{init_logging, level_from_verbosity};
use nc_web::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod duration;

use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Misinformation checks backed by Gemini, plus a small blog API", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[arg(long, default_value = "memory", help = "Blog storage backend: memory (default), sqlite")]
    storage: String,
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    #[arg(long, default_value = "gemini", help = "Model to use for inference. Available models: gemini (default), dummy")]
    model: String,
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,
    /// Model name used when a request does not pick one
    #[arg(long)]
    default_model: Option<String>,
    #[arg(long)]
    model_url: Option<String>,
    #[arg(long, env = "BING_NEWS_API_KEY", hide_env_values = true)]
    bing_api_key: Option<String>,
    #[arg(long, env = "CLOUDINARY_CLOUD_NAME")]
    cloudinary_cloud_name: Option<String>,
    #[arg(long, env = "CLOUDINARY_API_KEY", hide_env_values = true)]
    cloudinary_api_key: Option<String>,
    #[arg(long, env = "CLOUDINARY_API_SECRET", hide_env_values = true)]
    cloudinary_api_secret: Option<String>,
    /// Read the title and description of analyzed URLs
    #[arg(long)]
    fetch_pages: bool,
    /// Timeout for upstream calls (e.g. 30s, 1m, 1m30s)
    #[arg(long, default_value = "30s")]
    timeout: HumanDuration,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "PORT", default_value_t = 3000)]
        port: u16,
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Directory holding the front-end pages
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Analyze one claim and print the verdict as JSON
    Analyze {
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        text: Option<String>,
    },
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

async fn build_state(cli: &Cli) -> Result<AppState> {
    let config = Config {
        api_key: non_empty(&cli.gemini_api_key),
        model_name: Some(cli.model.clone()),
        inference_config: InferenceConfig {
            model_url: cli.model_url.clone(),
            default_model: cli.default_model.clone(),
            timeout: cli.timeout.0,
        },
    };
    let inference_model = match nc_inference::create_model(Some(config)).await {
        Ok(model) => Some(model),
        Err(Error::MissingConfig(name)) => {
            warn!("⚠️ {} is not set, analysis and chat requests will fail", name);
            None
        }
        Err(e) => return Err(e),
    };

    let news_source: Arc<dyn NewsSource> = match non_empty(&cli.bing_api_key) {
        Some(key) => {
            let config = BingConfig {
                timeout: cli.timeout.0,
                ..BingConfig::new(key)
            };
            Arc::new(BingNewsClient::new(config)?)
        }
        None => {
            info!("📰 No Bing News key, analyzing without news context");
            Arc::new(StaticNewsSource::empty())
        }
    };

    let page_fetcher = if cli.fetch_pages {
        Some(PageFetcher::new(cli.timeout.0)?)
    } else {
        None
    };

    let blog_storage = nc_storage::create_storage(&cli.storage, cli.database_url.as_deref()).await?;

    Ok(AppState {
        inference_model,
        news_source,
        page_fetcher,
        blog_storage,
        image_store: create_image_store(cli)?,
    })
}

fn create_image_store(cli: &Cli) -> Result<Arc<dyn ImageStore>> {
    let credentials = (
        non_empty(&cli.cloudinary_cloud_name),
        non_empty(&cli.cloudinary_api_key),
        non_empty(&cli.cloudinary_api_secret),
    );
    match credentials {
        (Some(cloud_name), Some(api_key), Some(api_secret)) => {
            let config = CloudinaryConfig {
                timeout: cli.timeout.0,
                ..CloudinaryConfig::new(cloud_name, api_key, api_secret)
            };
            info!("🖼️ Image uploads go to Cloudinary ({})", config.cloud_name);
            Ok(Arc::new(CloudinaryImageStore::new(config)?))
        }
        _ => {
            warn!("⚠️ Cloudinary is not configured, keeping uploaded images in memory");
            Ok(Arc::new(MemoryImageStore::new()))
        }
    }
}

/// Lists posts once to make sure the backend answers before serving traffic.
async fn check_storage(storage: &Arc<dyn BlogStorage>, kind: &str, max_retries: u32, timeout: Duration) -> Result<()> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let error = match tokio::time::timeout(timeout, storage.list_posts()).await {
            Ok(Ok(posts)) => {
                info!("🏦 Storage backend ready (using {}, {} post(s))", kind, posts.len());
                return Ok(());
            }
            Ok(Err(e)) => e,
            Err(_) => Error::Storage(format!("Storage health check timed out after {:?}", timeout)),
        };
        if attempt >= max_retries {
            return Err(error);
        }
        info!("Storage health check failed ({}), retrying {}/{}...", error, attempt, max_retries);
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(level_from_verbosity(cli.verbose));

    let state = build_state(&cli).await?;

    match cli.command {
        Commands::Serve { port, host, static_dir } => {
            check_storage(&state.blog_storage, &cli.storage, 3, Duration::from_secs(10)).await?;

            let app = nc_web::create_app(state, static_dir.as_deref());
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("🚀 Server running on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Analyze { url, text } => {
            let verdict = analyze_claim(&state, AnalyzeRequest { url, text }).await?;
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
    }

    Ok(())
}
