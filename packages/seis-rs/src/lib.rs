pub mod baseline;
pub mod cisn;
pub mod denoise;
pub mod error;
pub mod event;
pub mod fitting;
pub mod hypodd;
pub mod inventory;
pub mod io;
pub mod metadata;
pub mod mmap_utils;
pub mod momenttensor;
pub mod parser;
pub mod pipeline;
pub mod profiling;
pub mod projection;
pub mod rotate;
pub mod settings;
pub mod specfem;
pub mod subset;
pub mod types;
pub mod wavelet;

pub use baseline::{correct_baseline, BaselineFit};
pub use error::{Result, SeisError};
pub use event::{Catalog, Event};
pub use inventory::{Inventory, StationIndex};
pub use pipeline::{
    correct_stream, denoise_stream, split_stream, BaselineConfig, DenoiseConfig, FailurePolicy,
};
pub use types::*;
pub use wavelet::{decompose, reconstruct, Decomposition, ExtensionMode, Wavelet};
