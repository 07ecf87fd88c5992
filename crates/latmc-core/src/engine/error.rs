use thiserror::Error;

use crate::core::lattice::LatticeError;
use crate::core::models::GraphError;
use crate::core::potentials::ParamLoadError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Lattice(#[from] LatticeError),

    #[error("Parameter loading failed: {source}")]
    Params {
        #[from]
        source: ParamLoadError,
    },

    #[error("Feature '{feature}' was queried before its first synchronize")]
    NotSynchronized { feature: &'static str },

    #[error("Multiple occupation at lattice cell ({x}, {y}, {z}) during bulk fill")]
    MultipleOccupation { x: i32, y: i32, z: i32 },

    #[error("Label {label} appears on more than one monomer")]
    DuplicateLabel { label: u32 },

    #[error("Feature ordering constraints form a cycle among: {features:?}")]
    DependencyCycle { features: Vec<&'static str> },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
