use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, VectorizerError};
use crate::vectorizer::document::Document;

/// Load one `Document` per non-empty line of `list_file`.
///
/// Each line is a path relative to `prefix`; the document path becomes
/// `prefix/line`. Lines are split on `\n` with a trailing `\r` dropped, so
/// CRLF files and a final newline are tolerated. Order follows the file.
///
/// # Errors
/// * `MalformedListFile` - the file cannot be read or is not UTF-8
/// * `InvalidPath` - a line yields a path without a file name
pub fn load_docs(list_file: impl AsRef<Path>, prefix: &str) -> Result<Vec<Document>> {
    let list_file = list_file.as_ref();
    let text = fs::read_to_string(list_file).map_err(|source| VectorizerError::MalformedListFile {
        path: list_file.to_path_buf(),
        source,
    })?;

    let docs = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(|line| Document::new(format!("{prefix}/{line}")))
        .collect::<Result<Vec<_>>>()?;

    debug!(list_file = %list_file.display(), docs = docs.len(), "loaded document list");
    Ok(docs)
}
