mod output;
mod server;
mod telemetry;

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use dora_collect::collector::{CollectConfig, Collector};
use dora_collect::github::{GitHubClient, GitHubConfig};
use dora_core::config::Config;
use dora_core::history::WriteMode;
use dora_core::time::{parse_duration_str, parse_github_time};
use dora_render::{BarChart, LoadState, MetricsSource, RenderTarget, SvgRenderer, load_and_render};
use serde::Serialize;

use crate::output::{print_entry_human, print_snapshot_human};
use crate::server::ServeConfig;
use crate::telemetry::init_cli_tracing;

#[derive(Parser, Debug)]
#[command(name = "dora")]
#[command(about = "Collect and chart DORA delivery metrics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true, help = "Base URL or directory holding the metrics file")]
    source: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Compute metrics from GitHub Actions and write the metrics file")]
    Collect {
        #[arg(long, help = "Repository as owner/name")]
        repo: Option<String>,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, help = "Keep previous readings as a history array")]
        append: bool,
        #[arg(long, help = "Deployment frequency window (e.g. 7d)")]
        window: Option<String>,
        #[arg(long, help = "Evaluate the window as of this RFC3339 time")]
        as_of: Option<String>,
        #[arg(long)]
        api_url: Option<String>,
    },
    #[command(about = "Fetch the metrics file and draw the bar chart")]
    Render {
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        canvas: Option<String>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
    },
    #[command(about = "Print the latest metrics snapshot")]
    Show,
    #[command(about = "Serve the metrics file and a live chart over HTTP")]
    Serve {
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        addr: Option<String>,
    },
}

#[derive(Debug, Serialize)]
struct RenderReport {
    state: LoadState,
    canvas: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = Config::load().context("load config")?;
    if let Some(source) = cli.source {
        cfg.source = source;
    }

    match cli.command {
        Commands::Collect {
            repo,
            branch,
            output,
            append,
            window,
            as_of,
            api_url,
        } => {
            init_cli_tracing("warn");
            if let Some(v) = repo {
                cfg.repository = Some(v);
            }
            if let Some(v) = branch {
                cfg.branch = v;
            }
            if let Some(v) = window {
                cfg.frequency_window = parse_duration_str(&v)?;
            }
            if let Some(v) = api_url {
                cfg.github_api_url = v;
            }
            if append {
                cfg.write_mode = WriteMode::Append;
            }
            let now = as_of
                .map(|v| parse_github_time(&v))
                .transpose()?
                .unwrap_or_else(Utc::now);
            let output = output.unwrap_or_else(|| PathBuf::from(&cfg.metrics_file));
            run_collect(&cfg, output, now, cli.json).await
        }
        Commands::Render {
            out_dir,
            canvas,
            width,
            height,
        } => {
            init_cli_tracing("error");
            if let Some(v) = out_dir {
                cfg.out_dir = v;
            }
            if let Some(v) = canvas {
                cfg.canvas_id = v;
            }
            if let Some(v) = width {
                cfg.chart_width = v;
            }
            if let Some(v) = height {
                cfg.chart_height = v;
            }
            run_render(&cfg, cli.json).await
        }
        Commands::Show => {
            init_cli_tracing("error");
            run_show(&cfg, cli.json).await
        }
        Commands::Serve { dir, addr } => {
            init_cli_tracing("info");
            let addr = addr.unwrap_or_else(|| cfg.serve_addr.clone());
            let dir = serve_dir(dir, &cfg.source);
            server::run(
                ServeConfig {
                    dir,
                    target: RenderTarget::from_config(&cfg),
                    width: cfg.chart_width,
                    height: cfg.chart_height,
                },
                addr.parse().with_context(|| format!("invalid serve address {addr}"))?,
            )
            .await
        }
    }
}

fn serve_dir(dir: Option<PathBuf>, source: &str) -> PathBuf {
    match dir {
        Some(dir) => dir,
        None if source.starts_with("http://") || source.starts_with("https://") => {
            PathBuf::from(".")
        }
        None => PathBuf::from(source),
    }
}

async fn run_collect(
    cfg: &Config,
    output: PathBuf,
    now: chrono::DateTime<Utc>,
    json: bool,
) -> anyhow::Result<()> {
    let token = cfg.github_token()?;
    let repository = cfg.require_repository()?.to_string();
    let client = GitHubClient::new(&GitHubConfig {
        api_url: cfg.github_api_url.clone(),
        repository,
        token,
        timeout: cfg.http_timeout,
    })?;
    let collector = Collector::new(
        client,
        CollectConfig {
            branch: cfg.branch.clone(),
            per_page: cfg.per_page,
            frequency_window: cfg.frequency_window,
        },
    );

    let entry = collector
        .collect_into(&output, cfg.write_mode, now)
        .await
        .context("failed to calculate DORA metrics")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        print_entry_human(&entry);
    }
    Ok(())
}

async fn run_render(cfg: &Config, json: bool) -> anyhow::Result<()> {
    let source = MetricsSource::from_location(&cfg.source, cfg.http_timeout)?;
    let target = RenderTarget::from_config(cfg);
    let mut renderer = SvgRenderer::new(&cfg.out_dir, cfg.chart_width, cfg.chart_height);

    let state = load_and_render(&source, &target, &mut renderer).await;
    let report = RenderReport {
        state,
        canvas: (state == LoadState::Rendered).then(|| renderer.canvas_path(&target.canvas_id)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(path) = &report.canvas {
        println!("rendered {}", path.display());
    }
    Ok(())
}

async fn run_show(cfg: &Config, json: bool) -> anyhow::Result<()> {
    let source = MetricsSource::from_location(&cfg.source, cfg.http_timeout)?;
    let snapshot = source
        .load_snapshot(&cfg.metrics_file)
        .await
        .with_context(|| format!("load {}", source.describe(&cfg.metrics_file)))?;
    let chart = BarChart::from_snapshot(&snapshot);

    if json {
        let body = serde_json::json!({ "snapshot": snapshot, "chart": chart });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_snapshot_human(&snapshot, &chart);
    }
    Ok(())
}
