use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use feed_scout::browser_manager::BrowserSession;
use feed_scout::core::config::load_config;
use feed_scout::scraping::surface::CdpSurface;
use feed_scout::scraping::wait::pause;
use feed_scout::{export, session, Harvester};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Hashtag to search for (e.g. tmasolutions). A leading `#` is ignored.
    #[arg(long)]
    hashtag: String,

    /// Output folder.
    #[arg(long, default_value = "./output")]
    output: PathBuf,

    /// Path to feed-scout.json (otherwise FEED_SCOUT_CONFIG, then ./feed-scout.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run the browser without a window. Only useful with a stored session.
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,chromiumoxide=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config = load_config(cli.config.as_deref());
    let harvester = Harvester::from_config(&config)?;

    let topic = session::normalize_topic(&cli.hashtag);
    if topic.is_empty() {
        anyhow::bail!("--hashtag is empty after normalization");
    }
    std::fs::create_dir_all(&cli.output)?;
    let search_url = session::search_url(&topic)?;

    let headless = cli.headless || config.session.resolve_headless();
    let browser = BrowserSession::launch(headless).await?;

    let result: anyhow::Result<PathBuf> = async {
        let page = browser.page();
        session::ensure_authenticated(page, &config.session).await?;

        info!("🔎 opening search results for #{}", topic);
        page.goto(search_url.as_str())
            .await
            .map_err(|e| anyhow::anyhow!("failed to open search results: {}", e))?;
        pause(config.session.resolve_navigation_settle_ms()).await;

        let surface = CdpSurface::new(page.clone());
        let report = harvester.run(&surface).await?;
        info!(
            "scroll: {:?} after {} ticks | see more {}/{} | comment toggles {}/{} | load more {} rounds ({:?})",
            report.scroll.termination,
            report.scroll.ticks,
            report.see_more.activated,
            report.see_more.found,
            report.comment_toggles.activated,
            report.comment_toggles.found,
            report.load_more.rounds,
            report.load_more.termination
        );

        export::save_posts(&cli.output, &topic, &report.posts)
    }
    .await;

    browser.close().await;

    match result {
        Ok(path) => {
            info!("done: {}", path.display());
            Ok(())
        }
        Err(e) => {
            error!("run failed: {}", e);
            Err(e)
        }
    }
}
