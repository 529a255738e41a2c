use crate::cli::WaveletsArgs;
use crate::exit_codes;
use crate::output;
use seis_rs::wavelet::{Wavelet, WAVELET_REGISTRY};

pub fn execute(args: WaveletsArgs) -> i32 {
    if args.json {
        if let Err(e) = output::emit(&WAVELET_REGISTRY, None, false) {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
        return exit_codes::SUCCESS;
    }

    println!("Available wavelet bases:\n");
    println!(
        "  {:<8} {:<12} {:<8} {:<8}",
        "Name", "Family", "Taps", "Moments"
    );
    println!("  {}", "-".repeat(40));
    for m in WAVELET_REGISTRY {
        let marker = if m.wavelet == Wavelet::default() { " (default)" } else { "" };
        println!(
            "  {:<8} {:<12} {:<8} {:<8}{}",
            m.name, m.family, m.filter_length, m.vanishing_moments, marker
        );
    }
    println!();
    println!("Extension modes: zero, constant, symmetric (default), periodic");
    exit_codes::SUCCESS
}
