//! Reader errors

use thiserror::Error;

use crate::error::ClientError;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Chapter {chapter} not found in {slug}")]
    ChapterNotFound { slug: String, chapter: String },

    /// Comic detail could not be loaded for the requested slug
    #[error("Comic {0} is unavailable")]
    ComicUnavailable(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}
