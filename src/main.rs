use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("voronoi_word_cloud=info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = voronoi_word_cloud::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
