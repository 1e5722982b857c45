//! Built-in startup checks

use std::path::Path;

use super::check::ErrorMessage;

pub mod broker;
pub mod certificates;
pub mod database;
pub mod patavi;

/// Message for a required file that does not exist at its configured location
pub(crate) fn missing_file_message(label: &str, path: Option<&Path>) -> ErrorMessage {
    match path {
        Some(path) => ErrorMessage::new(format!(
            "Patavi {label} not found at <i>{}</i>. Please make sure it is accessible at the specified location.",
            path.display()
        )),
        None => ErrorMessage::new(format!(
            "Patavi {label} not found. Please make sure its location is configured."
        )),
    }
}

/// Returns one message per file in `files` that is unset or absent, in order
pub(crate) fn missing_files<'a>(
    files: impl IntoIterator<Item = (&'a str, Option<&'a Path>)>,
) -> Vec<ErrorMessage> {
    files
        .into_iter()
        .filter(|(_, path)| !path.is_some_and(Path::exists))
        .map(|(label, path)| missing_file_message(label, path))
        .collect()
}
