mod deepgram;
mod provider;

pub use deepgram::DeepgramProvider;
pub use provider::{
    SttProvider, SttStream, SttStreamOptions, TranscriptBatch, CALIBRATION_STREAM, PRIMARY_STREAM,
};
