use thiserror::Error;

#[derive(Error, Debug)]
pub enum CiteSightError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown engine id: {0}")]
    UnknownEngine(String),

    #[error("Unknown simulation provider: {0}")]
    UnknownProvider(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Report assembly error: {0}")]
    Assembly(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
