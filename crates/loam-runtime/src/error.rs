use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("manual chunk loading is disabled; set `manually_control_chunk_loading`")]
    ManualLoadingDisabled,
    #[error("no pending request `{0}`")]
    UnknownRequest(String),
    #[error("malformed request id `{0}` (expected `i|j|k|world`)")]
    BadRequestId(String),
    #[error("invalid engine config: {0}")]
    Config(String),
    #[error("failed to read engine config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse engine config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to start generator pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
