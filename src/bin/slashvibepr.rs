use slashvibepr::config::{
    load_settings, resolve_config_path, validate_startup, Secrets, SettingsSource,
};
use slashvibepr::runtime::{init_logging, run_supervisor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn run() -> Result<(), String> {
    let config_path = resolve_config_path();
    let loaded = load_settings(&config_path).map_err(|e| e.to_string())?;
    let level = init_logging(&loaded.settings.logging.level);

    match &loaded.source {
        SettingsSource::File(path) => {
            tracing::info!(path = %path.display(), ?level, "loaded configuration");
        }
        SettingsSource::Defaults { missing } => {
            tracing::warn!(path = %missing.display(), "config file not found, using defaults");
        }
    }

    let secrets = Secrets::from_env();
    validate_startup(&loaded.settings, &secrets).map_err(|e| e.to_string())?;

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        handler_stop.store(true, Ordering::Relaxed);
    })
    .map_err(|e| format!("failed to install signal handler: {e}"))?;

    tracing::info!(
        initiation = %loaded.settings.dialog.initiation,
        "starting slash-vibe-pr"
    );
    let report = run_supervisor(loaded.settings, &secrets, stop).map_err(|e| e.to_string())?;
    if !report.unfinished.is_empty() {
        tracing::warn!(workers = report.unfinished.len(), "exited with unfinished workers");
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        tracing::error!(error = %err, "fatal");
        eprintln!("{err}");
        std::process::exit(1);
    }
}
