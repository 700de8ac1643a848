//! Multipart form collection
//!
//! Handlers need the whole form before they can act (files and parameters
//! arrive in client-chosen order), so the multipart body is drained into
//! one structure first. Fields carrying a filename are treated as file
//! uploads; everything else is a text parameter.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::error::{Error, Result};

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

/// A fully drained multipart form.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl FormData {
    /// Drain the multipart body into memory.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| Error::MissingInput(format!("unreadable multipart body: {e}")))?
        {
            let name = field.name().unwrap_or("").to_string();

            match field.file_name().map(|s| s.to_string()) {
                Some(filename) => {
                    let data = field.bytes().await.map_err(|e| {
                        Error::MissingInput(format!("failed to read upload '{name}': {e}"))
                    })?;
                    form.files
                        .entry(name)
                        .or_default()
                        .push(UploadedFile { filename, data });
                }
                None => {
                    let value = field.text().await.map_err(|e| {
                        Error::MissingInput(format!("failed to read field '{name}': {e}"))
                    })?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// A text field's value, if the client sent one.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// All files uploaded under `name`, in upload order.
    pub fn files(&self, name: &str) -> &[UploadedFile] {
        self.files.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The file uploaded under `name`, or `MissingInput`.
    pub fn require_file(&self, name: &str) -> Result<&UploadedFile> {
        let file = self
            .files(name)
            .first()
            .ok_or_else(|| Error::MissingInput(format!("no '{name}' file uploaded")))?;
        if file.filename.is_empty() {
            return Err(Error::MissingInput("no file selected".to_string()));
        }
        Ok(file)
    }

    /// The file uploaded under `name`, which must carry one of the given
    /// extensions (case-insensitive).
    pub fn require_file_with_extension(
        &self,
        name: &str,
        extensions: &[&str],
    ) -> Result<&UploadedFile> {
        let file = self.require_file(name)?;
        let filename = file.filename.to_lowercase();
        if !extensions.iter().any(|ext| filename.ends_with(ext)) {
            return Err(Error::MissingInput(format!(
                "invalid file format for '{}': expected {}",
                file.filename,
                extensions.join(" or ")
            )));
        }
        Ok(file)
    }

    /// Parse an enum-like field, falling back to `default` when the field
    /// is absent or blank. A present-but-unknown value is rejected.
    pub fn parse_or<T>(&self, name: &str, default: T) -> Result<T>
    where
        T: FromStr<Err = Error>,
    {
        match self.text(name) {
            None => Ok(default),
            Some("") => Ok(default),
            Some(value) => value.parse(),
        }
    }

    /// Parse a numeric field, falling back to `default` when absent or
    /// blank. A present-but-unparseable value is rejected.
    pub fn number_or<T>(&self, name: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.text(name) {
            None => Ok(default),
            Some("") => Ok(default),
            Some(value) => value.trim().parse().map_err(|e| {
                Error::InvalidParameter(format!("field '{name}': {e}"))
            }),
        }
    }
}
