use thiserror::Error;
use wxc_core::AppError;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Invalid canvas size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("Forecast for {0} has no data points")]
    EmptySeries(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("Dashboard template failed: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tera::Error> for ChartError {
    fn from(e: tera::Error) -> Self {
        // Tera keeps the useful detail in the source chain.
        let mut message = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::Template(message)
    }
}

impl From<ChartError> for AppError {
    fn from(e: ChartError) -> Self {
        match e {
            ChartError::Io(e) => AppError::Io(e),
            other => AppError::Other(anyhow::Error::new(other)),
        }
    }
}
