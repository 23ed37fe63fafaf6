//! Pressure capture and plotting for cube drop tests.
//!
//! A run is captured from the end-effector pressure sensor with [`acquire`], saved with
//! [`codec::write_file`], and later loaded with [`codec::read_file`] and drawn with
//! [`Plot`].

mod config;
mod run;
mod termination;
mod source;
mod acquire;
pub mod codec;
mod render;

#[derive(Debug)]
pub enum Error {
    Acquisition(AcquisitionError),
    Codec(CodecError),
    Render(RenderError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Acquisition(error) =>
                write!(f, "acquisition failed: {}", error),
            Self::Codec(error) =>
                write!(f, "pressure series file: {}", error),
            Self::Render(error) =>
                write!(f, "cannot render plot: {}", error),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Acquisition(error) => Some(error),
            Self::Codec(error) => Some(error),
            Self::Render(error) => Some(error),
        }
    }
}

impl From<AcquisitionError> for Error {
    fn from(error: AcquisitionError) -> Self {
        Error::Acquisition(error)
    }
}

impl From<CodecError> for Error {
    fn from(error: CodecError) -> Self {
        Error::Codec(error)
    }
}

impl From<RenderError> for Error {
    fn from(error: RenderError) -> Self {
        Error::Render(error)
    }
}

pub type Result<T> =
    core::result::Result<T, Error>;

pub use config::{
    ATM_THRESH,
    ATM_COUNT_THRESH,
    SAMPLE_WIDTH,
    SAMPLE_MASK,
    BAUD_RATE,
    DEFAULT_PORT,
    DEFAULT_FILENAME,
    AcquisitionConfig,
    SerialConfig,
};

pub use run::{
    Sample,
    Run,
};

pub use termination::AtmosphereDetector;

pub use source::{
    SENSOR_PERIOD,
    DataSource,
    Simulator,
};

pub use acquire::{
    AcquisitionError,
    Clock,
    SystemClock,
    AcquisitionSession,
    acquire,
};

pub use codec::CodecError;

pub use render::{
    X_DOMAIN,
    X_LABEL,
    Y_LABEL,
    RenderError,
    PlotStyle,
    Plot,
    seconds_to_hours,
};
