use crate::cli::{BaselineArgs, DenoiseArgs};
use chrono::{DateTime, Utc};
use seis_rs::wavelet::{ExtensionMode, Wavelet};
use seis_rs::{parse_utc, settings, BaselineConfig, DenoiseConfig, FailurePolicy, Stream};
use serde::Deserialize;
use std::path::Path;

pub fn failure_policy(continue_on_error: bool) -> FailurePolicy {
    if continue_on_error {
        FailurePolicy::Skip
    } else {
        FailurePolicy::Abort
    }
}

/// Load a stream file, mapping errors to a message.
pub fn load_stream(file_path: &str) -> Result<Stream, String> {
    seis_rs::io::load(Path::new(file_path))
        .map_err(|e| format!("Failed to read stream '{}': {}", file_path, e))
}

/// Input files from exactly one of --file, --files or --glob.
pub fn resolve_files(
    file: &Option<String>,
    files: &Option<Vec<String>>,
    pattern: &Option<String>,
) -> Result<Vec<String>, String> {
    match (file, files, pattern) {
        (Some(f), None, None) => Ok(vec![f.clone()]),
        (None, Some(fs), None) => Ok(fs.clone()),
        (None, None, Some(p)) => resolve_glob(p),
        (None, None, None) => Err("One of --file, --files, or --glob must be specified".to_string()),
        _ => Err("Only one of --file, --files, or --glob may be specified".to_string()),
    }
}

pub fn resolve_glob(pattern: &str) -> Result<Vec<String>, String> {
    let paths =
        glob::glob(pattern).map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;

    let mut files: Vec<String> = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    if let Some(s) = path.to_str() {
                        files.push(s.to_string());
                    }
                }
            }
            Err(e) => {
                log::warn!("glob error: {}", e);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Denoise parameters: settings file "denoise" section, then command-line overrides.
pub fn denoise_config(args: &DenoiseArgs) -> Result<DenoiseConfig, String> {
    let mut config = match args.settings {
        Some(ref path) => settings::load::<DenoiseConfig>(Path::new(path), Some("denoise"))
            .map_err(|e| format!("Invalid settings file '{}': {}", path, e))?,
        None => DenoiseConfig::default(),
    };

    if let Some(ref name) = args.wavelet {
        config.wavelet = Wavelet::from_name(name).map_err(|e| e.to_string())?;
    }
    if let Some(ref name) = args.mode {
        config.mode = ExtensionMode::from_name(name).map_err(|e| e.to_string())?;
    }
    if args.level.is_some() {
        config.level = args.level;
    }
    if let Some(window) = args.pre_event {
        config.pre_event_window = Some(window);
    }
    if let Some(factor) = args.reduction_factor {
        config.reduction_factor = factor;
    }
    if args.keep_background {
        config.remove_background = false;
    }
    config.store_noise = args.store_noise;

    if let Some(window) = config.pre_event_window {
        if !(window.is_finite() && window >= 0.0) {
            return Err(format!("Pre-event window must be >= 0, got {}", window));
        }
    }
    if !(config.reduction_factor.is_finite() && config.reduction_factor > 0.0) {
        return Err(format!(
            "Reduction factor must be positive, got {}",
            config.reduction_factor
        ));
    }
    if config.level == Some(0) {
        return Err("Decomposition level must be at least 1".to_string());
    }
    Ok(config)
}

/// "baseline" section of a settings file
#[derive(Debug, Default, Deserialize)]
struct BaselineSection {
    #[serde(default)]
    origin_time: Option<DateTime<Utc>>,
    #[serde(default)]
    tail_window: Option<f64>,
}

pub fn baseline_config(args: &BaselineArgs) -> Result<BaselineConfig, String> {
    let section = match args.settings {
        Some(ref path) => settings::load::<BaselineSection>(Path::new(path), Some("baseline"))
            .map_err(|e| format!("Invalid settings file '{}': {}", path, e))?,
        None => BaselineSection::default(),
    };

    let origin_time = match args.origin_time {
        Some(ref value) => parse_utc(value).map_err(|e| e.to_string())?,
        None => section
            .origin_time
            .ok_or_else(|| "An origin time is required (--origin-time or settings)".to_string())?,
    };

    let mut config = BaselineConfig::new(origin_time);
    config.tail_window = args.tail_window.or(section.tail_window);
    if let Some(window) = config.tail_window {
        if !(window.is_finite() && window > 0.0) {
            return Err(format!("Tail window must be positive, got {}", window));
        }
    }
    Ok(config)
}
