use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "seisutil",
    version,
    about = "Seismic waveform utilities: wavelet denoising and baseline correction",
    long_about = "Seismic waveform utilities: wavelet denoising and baseline correction of\n\
                  records stored as JSON streams.\n\
                  SPECFEM3D synthetics can be converted with `seisutil convert`."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert SPECFEM3D ASCII seismograms to a stream file
    Convert(ConvertArgs),
    /// Remove background and pre-event noise with a wavelet decomposition
    Denoise(DenoiseArgs),
    /// Remove baseline drift from acceleration records
    Baseline(BaselineArgs),
    /// List available wavelet bases
    Wavelets(WaveletsArgs),
    /// Check that a stream file can be processed
    Validate(ValidateArgs),
}

#[derive(Args)]
pub struct ConvertArgs {
    /// SPECFEM3D STATIONS file
    #[arg(long)]
    pub stations: String,

    /// Directory holding the seismogram files
    #[arg(long)]
    pub data_dir: String,

    /// Event origin time (e.g. 2014-08-24T10:20:44Z)
    #[arg(long)]
    pub origin_time: String,

    /// Channel code without the component letter
    #[arg(long, default_value = "HX")]
    pub channel: String,

    /// Quantity stored in the files (displacement, velocity, acceleration)
    #[arg(long, default_value = "velocity")]
    pub data_type: String,

    /// Epicenter as "lon,lat"; sets distance, azimuth and back-azimuth
    #[arg(long, allow_hyphen_values = true)]
    pub epicenter: Option<String>,

    /// UTM zone used for distances (e.g. "10" or "56S")
    #[arg(long, env = "SEIS_UTM_ZONE")]
    pub utm_zone: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}

#[derive(Args)]
pub struct DenoiseArgs {
    /// Stream file to denoise
    #[arg(long)]
    pub file: Option<String>,

    /// Several stream files
    #[arg(long, num_args = 1..)]
    pub files: Option<Vec<String>>,

    /// Glob pattern selecting stream files (e.g. "data/*.json")
    #[arg(long)]
    pub glob: Option<String>,

    /// JSON settings file; its "denoise" section provides defaults
    #[arg(long, env = "SEIS_SETTINGS")]
    pub settings: Option<String>,

    /// Wavelet basis (haar, db2, db4, sym4, coif1)
    #[arg(long)]
    pub wavelet: Option<String>,

    /// Signal extension mode (zero, constant, symmetric, periodic)
    #[arg(long)]
    pub mode: Option<String>,

    /// Decomposition depth (default: deepest possible)
    #[arg(long)]
    pub level: Option<usize>,

    /// Pre-event window in seconds; 0 disables thresholding
    #[arg(long)]
    pub pre_event: Option<f64>,

    /// Divides the pre-event threshold
    #[arg(long)]
    pub reduction_factor: Option<f64>,

    /// Keep levels that look like background noise
    #[arg(long, default_value_t = false)]
    pub keep_background: bool,

    /// Also write the removed noise as `<stem>_noise.json` (needs --output-dir)
    #[arg(long, default_value_t = false)]
    pub store_noise: bool,

    /// Output file for a single input (default: stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Directory receiving `<stem>_denoised.json` for every input
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Skip failing traces and files instead of stopping
    #[arg(long, default_value_t = false)]
    pub continue_on_error: bool,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct BaselineArgs {
    /// Stream file holding acceleration records
    #[arg(long)]
    pub file: String,

    /// Event origin time; taken from the settings file when omitted
    #[arg(long)]
    pub origin_time: Option<String>,

    /// Tail window in seconds (default: time from record start to origin)
    #[arg(long)]
    pub tail_window: Option<f64>,

    /// JSON settings file; its "baseline" section provides defaults
    #[arg(long, env = "SEIS_SETTINGS")]
    pub settings: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Skip failing traces instead of stopping
    #[arg(long, default_value_t = false)]
    pub continue_on_error: bool,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}

#[derive(Args)]
pub struct WaveletsArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Stream file path
    #[arg(long)]
    pub file: String,

    /// Wavelet basis used for the decomposition depth check
    #[arg(long, default_value = "db4")]
    pub wavelet: String,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Parse a "lon,lat" pair
pub fn parse_epicenter(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid epicenter '{}': expected 'lon,lat' in degrees",
            s
        ));
    }
    let lon = parts[0]
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid epicenter '{}': '{}' is not a number", s, parts[0]))?;
    let lat = parts[1]
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid epicenter '{}': '{}' is not a number", s, parts[1]))?;
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(format!("Epicenter '{}' is out of range", s));
    }
    Ok((lon, lat))
}
