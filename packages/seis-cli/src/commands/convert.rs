use crate::cli::{self, ConvertArgs};
use crate::exit_codes;
use crate::output;
use seis_rs::metadata::add_azimuth_distance;
use seis_rs::projection::UtmProjection;
use seis_rs::specfem::{read_stations, to_stream, DataType};
use seis_rs::parse_utc;
use std::path::Path;

pub fn execute(args: ConvertArgs) -> i32 {
    let data_type = match DataType::from_name(&args.data_type) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };
    let origin = match parse_utc(&args.origin_time) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let placement = match (&args.epicenter, &args.utm_zone) {
        (Some(epicenter), Some(zone)) => {
            let epicenter = match cli::parse_epicenter(epicenter) {
                Ok(e) => e,
                Err(msg) => {
                    eprintln!("Error: {}", msg);
                    return exit_codes::INPUT_ERROR;
                }
            };
            match UtmProjection::parse(zone) {
                Ok(utm) => Some((epicenter, utm)),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return exit_codes::INPUT_ERROR;
                }
            }
        }
        (None, None) => None,
        _ => {
            eprintln!("Error: --epicenter and --utm-zone must be given together");
            return exit_codes::INPUT_ERROR;
        }
    };

    let stations = match read_stations(Path::new(&args.stations)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let mut stream = match to_stream(
        &stations,
        Path::new(&args.data_dir),
        origin,
        &args.channel,
        data_type,
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    };

    if let Some((epicenter, utm)) = placement {
        if let Err(e) = add_azimuth_distance(&mut stream, epicenter, &utm) {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    }

    if let Err(e) = output::emit(&stream, args.output.as_deref(), args.compact) {
        eprintln!("Error: {}", e);
        return exit_codes::EXECUTION_ERROR;
    }
    log::info!("Converted {} stations into {} traces", stations.len(), stream.len());
    exit_codes::SUCCESS
}
