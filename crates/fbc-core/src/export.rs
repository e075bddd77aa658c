//! CSV export for collected comments.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use thiserror::Error;

use crate::Comment;

/// Column order of the exported CSV.
pub const HEADER: [&str; 7] = [
    "comment_id",
    "created_time",
    "author_id",
    "author_name",
    "message",
    "parent_id",
    "like_count",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Writes the header row followed by one row per comment.
///
/// Optional fields are written as empty cells so the column count is stable
/// across rows.
///
/// # Errors
///
/// Returns an error when the underlying writer fails.
pub fn write_comments_csv<W: io::Write>(
    comments: &[Comment],
    writer: W,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for comment in comments {
        csv_writer.write_record([
            comment.comment_id.as_str(),
            comment.created_time.as_str(),
            comment.author_id.as_deref().unwrap_or(""),
            comment.author_name.as_deref().unwrap_or(""),
            comment.message.as_str(),
            comment.parent_id.as_deref().unwrap_or(""),
            comment.like_count.to_string().as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the comments to a CSV file at `path`, creating or truncating it.
///
/// # Errors
///
/// Returns an error when the file cannot be created or written.
pub fn save_comments_csv(comments: &[Comment], path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_comments_csv(comments, BufWriter::new(file))
}

/// Renders the comments as an in-memory CSV string.
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn comments_csv_string(comments: &[Comment]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_comments_csv(comments, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
