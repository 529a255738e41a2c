use crate::cli::BaselineArgs;
use crate::exit_codes;
use crate::output;
use crate::params;
use seis_rs::correct_stream;

pub fn execute(args: BaselineArgs) -> i32 {
    let config = match params::baseline_config(&args) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };
    let mut stream = match params::load_stream(&args.file) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    let policy = params::failure_policy(args.continue_on_error);
    let report = match correct_stream(&mut stream, &config, policy) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: Baseline correction failed: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    };
    for failure in &report.failures {
        eprintln!("Skipped {}: {}", failure.trace_id, failure.message);
    }

    if let Err(e) = output::emit(&stream, args.output.as_deref(), args.compact) {
        eprintln!("Error: {}", e);
        return exit_codes::EXECUTION_ERROR;
    }

    if report.failures.is_empty() {
        exit_codes::SUCCESS
    } else {
        exit_codes::PARTIAL_FAILURE
    }
}
