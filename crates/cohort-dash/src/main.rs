mod bootstrap;

use anyhow::Result;
use cohort_core::coerce::ParsePolicy;
use cohort_core::settings::Settings;
use cohort_data::reader::resolve_data_path;
use cohort_runtime::orchestrator::RefreshOrchestrator;
use cohort_ui::app::{App, ViewMode};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Cohort Dash v{} starting", env!("CARGO_PKG_VERSION"));
    let month_desc = if settings.month.is_empty() {
        "all".to_string()
    } else {
        settings.month.join(", ")
    };
    tracing::info!(
        "View: {}, Theme: {}, Months: {}",
        settings.view,
        settings.theme,
        month_desc
    );

    // CLI --data wins; otherwise probe the standard locations.
    let data_path = settings.data.clone().or_else(bootstrap::discover_data_path);

    let policy = if settings.strict {
        ParsePolicy::Strict
    } else {
        ParsePolicy::Lenient
    };

    // Header display string: the resolved CSV's file name.
    let resolved = resolve_data_path(data_path.as_deref());
    let source = resolved
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| resolved.display().to_string());

    tracing::info!("Watching {}", resolved.display());

    let orchestrator = RefreshOrchestrator::new(
        u64::from(settings.refresh_rate),
        data_path,
        policy,
        settings.month.clone(),
    );

    let (rx, handle) = orchestrator.start();

    let app = App::new(
        &settings.theme,
        ViewMode::from_name(&settings.view),
        source,
        settings.month.clone(),
    );

    // Run the TUI event loop. The loop exits on 'q' / Ctrl+C inside the TUI.
    // We also listen for Ctrl+C at the OS level so that signals received
    // while the terminal is in raw mode are handled cleanly.
    tokio::select! {
        result = app.run(rx) => {
            handle.abort();
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down refresh task");
            handle.abort();
        }
    }

    Ok(())
}
