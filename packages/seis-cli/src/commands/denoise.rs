use crate::cli::DenoiseArgs;
use crate::exit_codes;
use crate::output;
use crate::params;
use seis_rs::{denoise_stream, split_stream, DenoiseConfig, FailurePolicy};
use std::path::Path;
use std::time::Instant;

/// Outcome of one input file
enum FileOutcome {
    Done { skipped_traces: usize },
    Failed,
}

pub fn execute(args: DenoiseArgs) -> i32 {
    let files = match params::resolve_files(&args.file, &args.files, &args.glob) {
        Ok(f) => f,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };
    if files.is_empty() {
        eprintln!("Error: No matching files found");
        return exit_codes::INPUT_ERROR;
    }
    if args.output.is_some() && files.len() > 1 {
        eprintln!("Error: --output takes a single input; use --output-dir for several files");
        return exit_codes::INPUT_ERROR;
    }
    if args.store_noise && args.output_dir.is_none() {
        eprintln!("Error: --store-noise requires --output-dir");
        return exit_codes::INPUT_ERROR;
    }

    let config = match params::denoise_config(&args) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };
    let policy = params::failure_policy(args.continue_on_error);

    if let Some(ref dir) = args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Error: Failed to create output directory '{}': {}", dir, e);
            return exit_codes::EXECUTION_ERROR;
        }
    }

    let total = files.len();
    let mut succeeded = 0usize;
    let mut failed = 0usize;
    let mut skipped_traces = 0usize;
    let start_time = Instant::now();

    for (i, file_path) in files.iter().enumerate() {
        if !args.quiet && total > 1 {
            eprintln!("[{}/{}] {}...", i + 1, total, file_path);
        }
        match process_file(file_path, &args, &config, policy) {
            FileOutcome::Done { skipped_traces: n } => {
                succeeded += 1;
                skipped_traces += n;
            }
            FileOutcome::Failed => {
                failed += 1;
                if !args.continue_on_error {
                    break;
                }
            }
        }
    }

    if !args.quiet {
        eprintln!(
            "Denoise complete: {}/{} files succeeded, {} traces skipped, {:.1}s",
            succeeded,
            total,
            skipped_traces,
            start_time.elapsed().as_secs_f64()
        );
    }

    if failed == 0 && skipped_traces == 0 {
        exit_codes::SUCCESS
    } else if succeeded > 0 {
        exit_codes::PARTIAL_FAILURE
    } else {
        exit_codes::EXECUTION_ERROR
    }
}

fn output_path(dir: &str, file_path: &str, suffix: &str) -> String {
    let stem = Path::new(file_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("stream");
    Path::new(dir)
        .join(format!("{}_{}.json", stem, suffix))
        .to_string_lossy()
        .into_owned()
}

fn process_file(
    file_path: &str,
    args: &DenoiseArgs,
    config: &DenoiseConfig,
    policy: FailurePolicy,
) -> FileOutcome {
    let mut stream = match params::load_stream(file_path) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("  Error: {}", msg);
            return FileOutcome::Failed;
        }
    };

    let (noise, report) = if config.store_noise {
        match split_stream(&stream, config, policy) {
            Ok(split) => {
                stream = split.signal;
                (Some(split.noise), split.report)
            }
            Err(e) => {
                eprintln!("  Denoising failed: {}", e);
                return FileOutcome::Failed;
            }
        }
    } else {
        match denoise_stream(&mut stream, config, policy) {
            Ok(report) => (None, report),
            Err(e) => {
                eprintln!("  Denoising failed: {}", e);
                return FileOutcome::Failed;
            }
        }
    };
    for failure in &report.failures {
        eprintln!("  Skipped {}: {}", failure.trace_id, failure.message);
    }

    let written = match args.output_dir {
        Some(ref dir) => {
            let signal = output::emit(
                &stream,
                Some(&output_path(dir, file_path, "denoised")),
                args.compact,
            );
            match noise {
                Some(ref noise) => signal.and_then(|_| {
                    output::emit(noise, Some(&output_path(dir, file_path, "noise")), args.compact)
                }),
                None => signal,
            }
        }
        None => match args.output {
            Some(ref path) => output::emit(&stream, Some(path), args.compact),
            None => output::emit(&stream, None, args.compact),
        },
    };
    if let Err(e) = written {
        eprintln!("  Error: {}", e);
        return FileOutcome::Failed;
    }

    FileOutcome::Done {
        skipped_traces: report.failures.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_uses_stem() {
        let path = output_path("/tmp/out", "data/event_01.json", "denoised");
        assert!(path.ends_with("event_01_denoised.json"));
        let path = output_path("/tmp/out", "event_01.json", "noise");
        assert!(path.ends_with("event_01_noise.json"));
    }
}
