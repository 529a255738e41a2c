//! Stream-level driver
//!
//! Applies the denoising and baseline stages to every trace of a stream.
//! Traces are independent and processed in parallel on working copies; the
//! caller's stream only receives the results once the failure policy allows.

use crate::baseline::{correct_baseline_in_place, BaselineFit};
use crate::denoise::{
    add_levels, signal_to_noise_ratio, suppress_background, suppress_pre_event_noise,
};
use crate::error::{Result, SeisError};
use crate::types::{seconds_between, Stream, Trace};
use crate::wavelet::{decompose, ExtensionMode, Wavelet};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// What to do when a single trace fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Return the first error and leave the stream unchanged
    #[default]
    Abort,
    /// Record the error and keep the trace unmodified
    Skip,
}

/// Wavelet denoising parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenoiseConfig {
    /// Zero levels whose kurtosis looks like background noise
    #[serde(default = "default_remove_background")]
    pub remove_background: bool,

    /// Seconds of quiet record before the event; `None` or 0 disables thresholding
    #[serde(default = "default_pre_event_window")]
    pub pre_event_window: Option<f64>,

    /// Divides the pre-event threshold (larger removes less)
    #[serde(default = "default_reduction_factor")]
    pub reduction_factor: f64,

    #[serde(default)]
    pub wavelet: Wavelet,

    #[serde(default)]
    pub mode: ExtensionMode,

    /// Decomposition depth; deepest possible when unset
    #[serde(default)]
    pub level: Option<usize>,

    /// Reconstruct the removed noise as a companion trace
    #[serde(default)]
    pub store_noise: bool,
}

fn default_remove_background() -> bool {
    true
}
fn default_pre_event_window() -> Option<f64> {
    Some(10.0)
}
fn default_reduction_factor() -> f64 {
    2.0
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            remove_background: true,
            pre_event_window: Some(10.0),
            reduction_factor: 2.0,
            wavelet: Wavelet::default(),
            mode: ExtensionMode::default(),
            level: None,
            store_noise: false,
        }
    }
}

/// Result of denoising one trace
#[derive(Debug, Clone)]
pub struct TraceDenoise {
    pub snr: Option<f64>,
    /// Detail levels used
    pub depth: usize,
    /// Reconstructed noise, when requested
    pub noise: Option<Trace>,
}

/// A trace the driver could not process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceFailure {
    pub index: usize,
    pub trace_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DenoiseReport {
    pub processed: usize,
    /// Per-trace signal-to-noise ratio, `None` for skipped or noise-free traces
    pub snr: Vec<Option<f64>>,
    pub failures: Vec<TraceFailure>,
}

/// Companion outputs of [`split_stream`], aligned with the input
#[derive(Debug, Clone)]
pub struct StreamSplit {
    pub signal: Stream,
    pub noise: Stream,
    pub report: DenoiseReport,
}

/// Denoise one trace in place and set its `snr`
///
/// The trace is only modified when every stage succeeds.
pub fn denoise_trace(trace: &mut Trace, config: &DenoiseConfig) -> Result<TraceDenoise> {
    trace.validate()?;

    let decomposition = decompose(&trace.data, config.wavelet, config.mode, config.level)?;
    let mut cleaned = decomposition.levels.clone();
    let mut noise: Vec<Vec<f64>> = cleaned.iter().map(|l| vec![0.0; l.len()]).collect();

    if config.remove_background {
        let (kept, removed) = suppress_background(&cleaned)?;
        cleaned = kept;
        noise = removed;
    }

    if let Some(window) = config.pre_event_window.filter(|w| *w > 0.0) {
        let (kept, removed) = suppress_pre_event_noise(
            &cleaned,
            window,
            trace.sampling_rate(),
            config.reduction_factor,
        )?;
        cleaned = kept;
        noise = add_levels(&noise, &removed)?;
    }

    let snr = signal_to_noise_ratio(&cleaned, &noise)?;
    let noise_trace = if config.store_noise {
        let samples = decomposition.with_levels(noise).reconstruct_truncated()?;
        Some(trace.with_data(samples))
    } else {
        None
    };
    let samples = decomposition.with_levels(cleaned).reconstruct_truncated()?;

    trace.data = samples;
    trace.stats.snr = snr;
    log::debug!(
        "{}: denoised with {} over {} levels, snr {:?}",
        trace.stats.id(),
        config.wavelet,
        decomposition.depth(),
        snr
    );

    Ok(TraceDenoise {
        snr,
        depth: decomposition.depth(),
        noise: noise_trace,
    })
}

/// Run `op` on working copies of every trace in parallel
///
/// Returns the processed copies and one outcome per trace. Under
/// `FailurePolicy::Abort` the lowest-index error is returned instead.
fn run_traces<T, F>(
    traces: &[Trace],
    policy: FailurePolicy,
    op: F,
) -> Result<(Vec<Trace>, Vec<Option<T>>, Vec<TraceFailure>)>
where
    T: Send,
    F: Fn(&mut Trace) -> Result<T> + Sync,
{
    let mut work = traces.to_vec();
    let results: Vec<Result<T>> = work.par_iter_mut().map(|tr| op(tr)).collect();

    let mut outcomes = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(value) => outcomes.push(Some(value)),
            Err(e) => {
                let trace_id = traces[index].stats.id();
                if policy == FailurePolicy::Abort {
                    log::error!("{}: {}", trace_id, e);
                    return Err(e);
                }
                log::warn!("Skipping trace {} ({}): {}", index, trace_id, e);
                failures.push(TraceFailure {
                    index,
                    trace_id,
                    message: e.to_string(),
                });
                // Failed operations leave their working copy untouched
                work[index] = traces[index].clone();
                outcomes.push(None);
            }
        }
    }
    Ok((work, outcomes, failures))
}

/// Denoise every trace of `stream` in place
pub fn denoise_stream(
    stream: &mut Stream,
    config: &DenoiseConfig,
    policy: FailurePolicy,
) -> Result<DenoiseReport> {
    crate::profile_scope!("denoise_stream");
    let config = DenoiseConfig {
        store_noise: false,
        ..config.clone()
    };
    let (traces, outcomes, failures) =
        run_traces(&stream.traces, policy, |tr| denoise_trace(tr, &config))?;
    stream.traces = traces;

    let report = DenoiseReport {
        processed: outcomes.iter().filter(|o| o.is_some()).count(),
        snr: outcomes
            .iter()
            .map(|o| o.as_ref().and_then(|d| d.snr))
            .collect(),
        failures,
    };
    log::info!(
        "Denoised {} of {} traces ({} skipped)",
        report.processed,
        stream.len(),
        report.failures.len()
    );
    Ok(report)
}

/// Separate `stream` into signal-only and noise-only companions
///
/// The input is not modified. A skipped trace appears unchanged in the signal
/// stream and as zeros in the noise stream.
pub fn split_stream(
    stream: &Stream,
    config: &DenoiseConfig,
    policy: FailurePolicy,
) -> Result<StreamSplit> {
    crate::profile_scope!("split_stream");
    let config = DenoiseConfig {
        store_noise: true,
        ..config.clone()
    };
    let (traces, outcomes, failures) =
        run_traces(&stream.traces, policy, |tr| denoise_trace(tr, &config))?;

    let mut snr = Vec::with_capacity(outcomes.len());
    let mut noise = Stream::default();
    for (trace, outcome) in traces.iter().zip(outcomes) {
        match outcome {
            Some(TraceDenoise {
                snr: value,
                noise: Some(noise_trace),
                ..
            }) => {
                snr.push(value);
                noise.push(noise_trace);
            }
            _ => {
                snr.push(None);
                noise.push(trace.with_data(vec![0.0; trace.npts()]));
            }
        }
    }

    let report = DenoiseReport {
        processed: stream.len() - failures.len(),
        snr,
        failures,
    };
    log::info!(
        "Split {} traces into signal and noise ({} skipped)",
        stream.len(),
        report.failures.len()
    );
    Ok(StreamSplit {
        signal: Stream::new(traces),
        noise,
        report,
    })
}

/// Baseline correction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Event origin time
    pub origin_time: DateTime<Utc>,
    /// Tail window in seconds; each trace's own origin offset when unset
    #[serde(default)]
    pub tail_window: Option<f64>,
}

impl BaselineConfig {
    pub fn new(origin_time: DateTime<Utc>) -> Self {
        Self {
            origin_time,
            tail_window: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineReport {
    pub processed: usize,
    pub failures: Vec<TraceFailure>,
}

/// Baseline-correct one acceleration trace in place
pub fn correct_trace(trace: &mut Trace, config: &BaselineConfig) -> Result<BaselineFit> {
    trace.validate()?;
    let origin_offset = seconds_between(trace.stats.starttime, config.origin_time);
    let tail_window = config.tail_window.unwrap_or(origin_offset);
    if tail_window <= 0.0 {
        return Err(SeisError::InvalidParameter(format!(
            "tail window must be positive, got {:.3} s",
            tail_window
        )));
    }

    let mut samples = trace.data.clone();
    let fit = correct_baseline_in_place(&mut samples, trace.stats.delta, origin_offset, tail_window)?;
    trace.data = samples;
    Ok(fit)
}

/// Baseline-correct every trace of `stream` in place
pub fn correct_stream(
    stream: &mut Stream,
    config: &BaselineConfig,
    policy: FailurePolicy,
) -> Result<BaselineReport> {
    crate::profile_scope!("correct_stream");
    let (traces, outcomes, failures) =
        run_traces(&stream.traces, policy, |tr| correct_trace(tr, config))?;
    stream.traces = traces;

    let report = BaselineReport {
        processed: outcomes.iter().filter(|o| o.is_some()).count(),
        failures,
    };
    log::info!(
        "Baseline corrected {} of {} traces",
        report.processed,
        stream.len()
    );
    Ok(report)
}
