mod api;
mod server;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::api::ApiPostView;
use crate::server::AppState;
use post_kpi::config::AppConfig;
use post_kpi::reconcile::parse_date;
use post_kpi::standards::{default_standards, table_to_named};
use post_kpi::store::{PostStore, StandardsStore};
use post_kpi::summary::{summarize, PurposeFilter, SummaryFilter};
use post_kpi::{format_number, Platform, Window};

#[derive(Parser)]
#[command(name = "post-kpi", about = "Social post KPI tracker")]
struct Cli {
    /// Config file (defaults to $KPI_CONFIG_PATH or config/kpi.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Classify every post and flag overdue metrics.
    Report(ReportArgs),
    /// Per-platform totals for published posts.
    Summary(SummaryArgs),
    Serve(ServeArgs),
    /// Write a default config and standards file.
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct ReportArgs {
    #[arg(long, default_value = "7d")]
    window: String,
    /// Evaluate as of this date (YYYY-MM-DD) instead of today.
    #[arg(long)]
    today: Option<String>,
    #[arg(long)]
    platform: Option<String>,
    /// Only posts published from this date (YYYY-MM-DD).
    #[arg(long)]
    from: Option<String>,
    /// Only posts published up to this date (YYYY-MM-DD).
    #[arg(long)]
    to: Option<String>,
    #[arg(long)]
    overdue_only: bool,
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            window: "7d".to_string(),
            today: None,
            platform: None,
            from: None,
            to: None,
            overdue_only: false,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct SummaryArgs {
    #[arg(long, default_value = "7d")]
    window: String,
    #[arg(long, default_value = "all")]
    purpose: String,
    #[arg(long)]
    platform: Option<String>,
    /// Restrict to one month (YYYY-MM).
    #[arg(long, conflicts_with_all = ["from", "to"])]
    month: Option<String>,
    /// Custom range start (YYYY-MM-DD).
    #[arg(long)]
    from: Option<String>,
    /// Custom range end (YYYY-MM-DD).
    #[arg(long)]
    to: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long, default_value = "config/kpi.toml")]
    path: PathBuf,
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let command = match cli.command.unwrap_or(Command::Report(ReportArgs::default())) {
        Command::InitConfig(args) => return run_init_config(args).await,
        command => command,
    };

    let (config, config_path) = AppConfig::load(cli.config)?;
    if let Some(path) = config_path.as_ref() {
        tracing::debug!(path = %path.display(), "resolved config path");
    }

    match command {
        Command::Report(args) => run_report(&config, args).await,
        Command::Summary(args) => run_summary(&config, args).await,
        Command::Serve(args) => run_serve(&config, args).await,
        Command::InitConfig(_) => Ok(()),
    }
}

async fn open_stores(config: &AppConfig) -> Result<(PostStore, StandardsStore), String> {
    let today = server::local_today();
    let posts = PostStore::load(config.store.posts_path.clone(), today).await?;
    let standards = StandardsStore::load(config.store.standards_path.clone()).await?;
    Ok((posts, standards))
}

async fn run_report(config: &AppConfig, args: ReportArgs) -> Result<(), String> {
    let window = Window::from_str(&args.window)
        .ok_or_else(|| format!("invalid window: {}", args.window))?;
    let today = match args.today.as_deref() {
        Some(raw) => parse_date(raw).ok_or_else(|| format!("invalid date: {}", raw))?,
        None => server::local_today(),
    };
    let platform = match args.platform.as_deref() {
        Some(raw) => Some(Platform::from_str(raw).ok_or_else(|| format!("invalid platform: {}", raw))?),
        None => None,
    };

    let filter = SummaryFilter {
        platform,
        ..SummaryFilter::default()
    }
    .with_period(None, args.from.as_deref(), args.to.as_deref())?;

    let (posts, standards) = open_stores(config).await?;
    let standards = standards.snapshot().await;

    let mut shown = 0usize;
    for post in posts.list().await {
        if !filter.matches(&post) {
            continue;
        }
        let view = ApiPostView::build(post, &standards, today);
        if args.overdue_only && view.alert.is_none() {
            continue;
        }
        let Some(window_view) = view.window(window) else {
            continue;
        };

        println!(
            "{} | {:<9} | {:<14} | {} | reach {} | engagement {} | rate {} | {} [{}]{}",
            view.post.publish_date,
            view.post.platform.label(),
            view.post.format.label(),
            view.post.topic,
            format_number(window_view.reach),
            format_number(window_view.engagement),
            window_view.rate,
            window_view.result.label,
            window_view.color,
            view.alert
                .as_ref()
                .map(|alert| format!(" | overdue: {}", alert.label))
                .unwrap_or_default()
        );
        shown += 1;
    }

    if shown == 0 {
        println!("No posts to report.");
    }
    Ok(())
}

async fn run_summary(config: &AppConfig, args: SummaryArgs) -> Result<(), String> {
    let window = Window::from_str(&args.window)
        .ok_or_else(|| format!("invalid window: {}", args.window))?;
    let purpose = PurposeFilter::from_str(&args.purpose)
        .ok_or_else(|| format!("invalid purpose filter: {}", args.purpose))?;
    let platform = match args.platform.as_deref() {
        Some(raw) => Some(Platform::from_str(raw).ok_or_else(|| format!("invalid platform: {}", raw))?),
        None => None,
    };

    let filter = SummaryFilter {
        purpose,
        platform,
        ..SummaryFilter::default()
    }
    .with_period(args.month.as_deref(), args.from.as_deref(), args.to.as_deref())?;

    let (posts, _) = open_stores(config).await?;
    let summary = summarize(&posts.list().await, window, &filter);

    println!("Published posts: {}", summary.published_posts);
    println!(
        "Total reach ({}): {} (excludes Threads, LINE, stories, comment-only)",
        window.label(),
        format_number(summary.total_reach)
    );
    println!(
        "Total engagement ({}): {} (excludes LINE, stories, comment-only)",
        window.label(),
        format_number(summary.total_engagement)
    );
    println!();
    for row in &summary.platforms {
        println!(
            "{:<9} posts {:>3} | reach/views {:>9} | engagement {:>7} | avg rate {}",
            row.platform.label(),
            row.posts,
            format_number(row.reach),
            format_number(row.engagement),
            row.rate_display()
        );
    }

    if !summary.type_counts.is_empty() {
        println!();
        println!("Post types:");
        for (post_type, count) in &summary.type_counts {
            println!("  {:<16} {}", post_type, count);
        }
    }
    Ok(())
}

async fn run_serve(config: &AppConfig, args: ServeArgs) -> Result<(), String> {
    let (posts, standards) = open_stores(config).await?;
    let state = AppState {
        posts: Arc::new(posts),
        standards: Arc::new(standards),
    };
    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    server::serve(state, &host, port).await
}

async fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.path.exists() && !args.force {
        return Err(format!(
            "config already exists: {} (pass --force to overwrite)",
            args.path.display()
        ));
    }
    let config = AppConfig::default();
    config.write(&args.path)?;
    println!("Wrote {}", args.path.display());

    let standards_path = &config.store.standards_path;
    if !standards_path.exists() || args.force {
        write_default_standards(standards_path)?;
        println!("Wrote {}", standards_path.display());
    }
    Ok(())
}

fn write_default_standards(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create standards dir: {}", err))?;
    }
    let payload = toml::to_string_pretty(&table_to_named(&default_standards()))
        .map_err(|err| format!("failed to serialize standards: {}", err))?;
    std::fs::write(path, payload).map_err(|err| format!("failed to write standards: {}", err))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
