mod encoder;

pub use encoder::{AudioCodec, AudioEncoder, AudioSpec, WavEncoder};
