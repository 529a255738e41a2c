use crate::cli::ValidateArgs;
use crate::exit_codes;
use crate::output;
use crate::params;
use seis_rs::wavelet::{max_level, Wavelet};
use serde::Serialize;

#[derive(Serialize)]
struct TraceCheck {
    id: String,
    npts: usize,
    sampling_rate: f64,
    /// Deepest decomposition the basis allows
    max_level: usize,
    error: Option<String>,
}

#[derive(Serialize)]
struct ValidateOutput {
    file: String,
    readable: bool,
    wavelet: String,
    traces: Vec<TraceCheck>,
    error: Option<String>,
}

pub fn execute(args: ValidateArgs) -> i32 {
    let wavelet = match Wavelet::from_name(&args.wavelet) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let (readable, traces, error) = match params::load_stream(&args.file) {
        Ok(stream) if stream.is_empty() => (true, Vec::new(), Some("Stream holds no traces".to_string())),
        Ok(stream) => {
            let traces: Vec<TraceCheck> = stream
                .iter()
                .map(|tr| {
                    let depth = max_level(tr.npts(), wavelet);
                    let error = match tr.validate() {
                        Err(e) => Some(e.to_string()),
                        Ok(()) if depth == 0 => Some(format!(
                            "{} samples are too few for a '{}' decomposition",
                            tr.npts(),
                            wavelet
                        )),
                        Ok(()) => None,
                    };
                    TraceCheck {
                        id: tr.stats.id(),
                        npts: tr.npts(),
                        sampling_rate: tr.sampling_rate(),
                        max_level: depth,
                        error,
                    }
                })
                .collect();
            let bad = traces.iter().filter(|t| t.error.is_some()).count();
            let error = (bad > 0).then(|| format!("{} of {} traces are unusable", bad, traces.len()));
            (true, traces, error)
        }
        Err(msg) => (false, Vec::new(), Some(msg)),
    };

    let result = ValidateOutput {
        file: args.file.clone(),
        readable,
        wavelet: wavelet.to_string(),
        traces,
        error: error.clone(),
    };

    if args.json {
        if let Err(e) = output::emit(&result, None, false) {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    } else {
        for tr in result.traces.iter().filter(|t| t.error.is_some()) {
            eprintln!("  {}: {}", tr.id, tr.error.as_deref().unwrap_or_default());
        }
        match error {
            Some(ref err) => eprintln!("Error: {}", err),
            None => println!(
                "File '{}' is valid ({} traces)",
                args.file,
                result.traces.len()
            ),
        }
    }

    if error.is_some() {
        exit_codes::INPUT_ERROR
    } else {
        exit_codes::SUCCESS
    }
}
