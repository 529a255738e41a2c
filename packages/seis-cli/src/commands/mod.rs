pub mod baseline;
pub mod convert;
pub mod denoise;
pub mod validate;
pub mod wavelets;
