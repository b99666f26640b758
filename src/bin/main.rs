use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_CONFIG: &str = "cinetalk-server.yaml";

#[derive(Parser, Debug)]
#[command(name = "cinetalk-server")]
#[command(about = "Movie community backend: reviews, comments, bookmarks and a TMDB proxy", long_about = None)]
struct Args {
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: String,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    debug: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.debug {
        "cinetalk_rs=debug,tower_http=debug"
    } else {
        "cinetalk_rs=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Only the default path may be absent.
    let optional = args.config == DEFAULT_CONFIG;

    if let Err(e) = cinetalk_rs::run(&args.config, optional, args.debug).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
