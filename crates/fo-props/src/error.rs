use fo_model::{MapKind, ModelError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropsError {
    #[error("{0} has zero total weight and cannot be normalized")]
    Degenerate(MapKind),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type PropsResult<T> = Result<T, PropsError>;
