/// Structural problems with an input frame.
///
/// These are the only failures the pipeline reports; "nothing detected" is a
/// valid zero-count result.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid frame dimensions (width={width}, height={height})")]
    ZeroDimensions { width: usize, height: usize },

    #[error("frame dimensions overflow (width={width}, height={height})")]
    TooLarge { width: usize, height: usize },

    #[error("unsupported channel count (expected {expected}, got {got})")]
    ChannelCount { expected: usize, got: usize },

    #[error("invalid frame buffer length (expected {expected} bytes, got {got})")]
    BufferLength { expected: usize, got: usize },
}

/// A tunable outside the range the pipeline can work with.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("invalid parameter `{name}` = {value}: {expected}")]
pub struct ParamsError {
    pub name: &'static str,
    pub value: f64,
    pub expected: &'static str,
}

impl ParamsError {
    pub fn new(name: &'static str, value: impl Into<f64>, expected: &'static str) -> Self {
        Self {
            name,
            value: value.into(),
            expected,
        }
    }
}
