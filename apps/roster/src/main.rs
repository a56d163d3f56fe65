use std::{num::NonZeroU32, sync::Arc};

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use roster_core::{
    load_settings, HttpChildrenBackend, PageController, RenderedPage, RosterEvent, SortKey,
};
use shared::domain::ChildId;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "roster", about = "Browse and manage registered children")]
struct Cli {
    /// Overrides `backend_url` from roster.toml / environment.
    #[arg(long)]
    backend_url: Option<String>,
    #[arg(long)]
    per_page: Option<NonZeroU32>,
    /// Print the rendered page as JSON instead of a table.
    #[arg(long)]
    json: bool,
    #[arg(long, default_value = "info")]
    log_filter: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one page of registered children.
    List {
        #[arg(long)]
        page: Option<u32>,
        /// Click a column header; repeat to toggle again.
        #[arg(long = "toggle", value_enum)]
        toggles: Vec<SortColumn>,
        #[arg(long)]
        filter: Option<String>,
    },
    /// Cancel a child's registration and show the refreshed page.
    Cancel {
        id: String,
        #[arg(long)]
        page: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortColumn {
    Name,
    BirthDate,
}

impl From<SortColumn> for SortKey {
    fn from(column: SortColumn) -> Self {
        match column {
            SortColumn::Name => SortKey::Name,
            SortColumn::BirthDate => SortKey::BirthDate,
        }
    }
}

/// Stands in for the router: mirrors page changes into the log.
fn spawn_event_logger(mut events: broadcast::Receiver<RosterEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(RosterEvent::PageSelected(page)) => info!(page, "page selected"),
                Ok(RosterEvent::PageLoaded { page, total_count }) => {
                    debug!(page, total_count, "page loaded")
                }
                Ok(RosterEvent::Error(error)) => {
                    warn!(context = ?error.context(), "{}", error.message())
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event logger lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

async fn open_page(controller: &PageController, page: Option<u32>) -> Result<()> {
    match page {
        Some(page) => controller.select_page(page).await?,
        None => controller.init().await?,
    };
    Ok(())
}

fn render_table(page: &RenderedPage) -> String {
    let mut out = String::new();
    let name_width = page
        .rows
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    out.push_str(&format!(
        "{:<8} {:<name_width$} {:<10} {:>3}\n",
        "ID", "NAME", "BIRTH DATE", "AGE"
    ));
    for row in &page.rows {
        out.push_str(&format!(
            "{:<8} {:<name_width$} {:<10} {:>3}\n",
            row.id.as_str(),
            row.name,
            row.birth_date.format("%Y-%m-%d").to_string(),
            row.age
        ));
    }
    let pages = page
        .pages
        .iter()
        .map(|number| {
            if *number == page.current_page {
                format!("[{number}]")
            } else {
                number.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&format!(
        "pages: {} ({} children)\n",
        if pages.is_empty() { "-".to_string() } else { pages },
        page.total_count
    ));
    if let Some(error) = &page.error {
        out.push_str(&format!("error: {}\n", error.message()));
    }
    out
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let mut settings = load_settings();
    if let Some(url) = cli.backend_url.clone() {
        settings.backend_url = url;
    }
    if let Some(per_page) = cli.per_page {
        settings.children_per_page = per_page;
    }

    let backend = Arc::new(HttpChildrenBackend::from_settings(&settings)?);
    let controller = PageController::from_settings(backend, &settings);
    spawn_event_logger(controller.subscribe_events());

    match cli.command {
        Command::List {
            page,
            toggles,
            filter,
        } => {
            open_page(&controller, page).await?;
            for column in toggles {
                match SortKey::from(column) {
                    SortKey::Name => controller.sort_by_name().await,
                    SortKey::BirthDate => controller.sort_by_birth_date().await,
                };
            }
            if let Some(filter) = filter {
                controller.apply_filter(&filter).await;
            }
        }
        Command::Cancel { id, page } => {
            open_page(&controller, page).await?;
            controller.cancel_registration(&ChildId::new(id)).await?;
        }
    }

    let rendered = controller
        .view_state()
        .await
        .render(Local::now().date_naive());
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        print!("{}", render_table(&rendered));
    }

    Ok(())
}
