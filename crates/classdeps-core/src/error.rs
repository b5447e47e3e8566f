use crate::catalog::CatalogError;
use crate::glob::GlobError;
use crate::seeds::SelectionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Glob(#[from] GlobError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}
