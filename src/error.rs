use thiserror::Error;

/// Errors reported by the cosmic-ray generators.
#[derive(Error, Debug)]
pub enum CrError {
    /// Energy, direction or flux was requested before any position update.
    #[error("orbit position has not been set; call set_position before sampling")]
    PositionNotSet,

    /// The component mask left no modelled component for the species.
    #[error("no active components for {species}")]
    NoActiveComponents { species: String },

    /// A component reported a negative or non-finite flux.
    #[error("{component} flux {flux} is not a usable weight")]
    InvalidFlux { component: &'static str, flux: f64 },

    /// Species name not recognised by the factory.
    #[error("unknown cosmic-ray species: {0}")]
    UnknownSpecies(String),

    /// Low-latitude grid does not have the 13 x 73 layout.
    #[error("low-latitude grid must hold {expected} values, found {found}")]
    GridShape { expected: usize, found: usize },

    #[error("failed to read low-latitude grid {path}: {source}")]
    GridIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid low-latitude grid json: {0}")]
    GridJson(#[from] serde_json::Error),
}

pub type CrResult<T> = Result<T, CrError>;
