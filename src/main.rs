use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use showreel::platform::SimulatedPlatform;
use showreel::{source, Page, ShowreelConfig};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "showreel", version, about = "Mount a portfolio page's carousels and videos headlessly")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a page (file or http(s) URL) and print the mounted state as JSON
    Scan {
        location: String,
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Base URL for relative media sources
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Let auto-advance run and print every carousel's active slide per tick
    Tour {
        location: String,
        #[arg(long, default_value_t = 3)]
        ticks: u32,
        /// Override the auto-advance period
        #[arg(long)]
        interval_ms: Option<u64>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ShowreelConfig> {
    match path {
        Some(p) => ShowreelConfig::from_path(p).with_context(|| format!("reading config {}", p.display())),
        None => Ok(ShowreelConfig::default()),
    }
}

// Controllers live on a single thread: current-thread runtime + LocalSet.
fn run_local<F: Future>(fut: F) -> anyhow::Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("building runtime")?;
    let local = tokio::task::LocalSet::new();
    Ok(local.block_on(&rt, fut))
}

fn scan(location: &str, config: ShowreelConfig) -> anyhow::Result<()> {
    let loaded = source::load_markup(location, &config).with_context(|| format!("loading {}", location))?;
    let markup = loaded.scan()?;
    let platform = SimulatedPlatform::new();

    let summary = run_local(async {
        let page = Page::mount(&markup, &platform, &config)?;
        Ok::<_, showreel::Error>(page.summary())
    })??;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn tour(location: &str, ticks: u32, config: ShowreelConfig) -> anyhow::Result<()> {
    let loaded = source::load_markup(location, &config).with_context(|| format!("loading {}", location))?;
    let markup = loaded.scan()?;
    let platform = SimulatedPlatform::new();

    run_local(async {
        let mut page = Page::mount(&markup, &platform, &config)?;
        let interval = config.auto_advance_interval();
        // Sample a little after each tick so the timers have fired
        let margin = (interval / 10).min(Duration::from_millis(250));
        let start = tokio::time::Instant::now();

        for tick in 1..=ticks {
            tokio::time::sleep_until(start + interval * tick + margin).await;
            let line = page
                .carousels()
                .iter()
                .map(|c| {
                    let c = c.borrow();
                    format!("{}={}/{}", c.id(), c.active_index() + 1, c.len())
                })
                .collect::<Vec<_>>()
                .join(" ");
            info!("tick {} sampled", tick);
            println!("tick {}: {}", tick, line);
        }

        page.dispose();
        Ok::<_, showreel::Error>(())
    })??;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Scan { location, config, base_url } => {
            let mut config = load_config(config.as_deref())?;
            if base_url.is_some() {
                config.base_url = base_url;
            }
            config.validate()?;
            scan(&location, config)
        }
        Command::Tour { location, ticks, interval_ms, config } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(ms) = interval_ms {
                config.auto_advance_ms = ms;
            }
            config.validate()?;
            tour(&location, ticks, config)
        }
    }
}
