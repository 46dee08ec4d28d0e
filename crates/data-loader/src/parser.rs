//! Parsers for the catalog and similarity artifacts.
//!
//! Both artifacts come in two flavours, picked by file extension:
//! - `.json`: serde_json documents
//!   - catalog: `[{"movie_id": 19995, "title": "Avatar"}, ...]`
//!   - matrix: `[[1.0, 0.2, ...], ...]`
//! - anything else: line-oriented text
//!   - catalog: `movieId::title` per line, or a bare title
//!   - matrix: one row per line, scores separated by whitespace or commas

use crate::error::{DataLoadError, Result};
use crate::types::Movie;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read an artifact into a string.
///
/// Files that are not valid UTF-8 are decoded as ISO-8859-1 (Latin-1), the
/// encoding MovieLens-style `.dat` exports use.
fn read_artifact(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    Ok(String::from_utf8(bytes)
        .unwrap_or_else(|e| e.into_bytes().iter().map(|&b| b as char).collect()))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse the catalog artifact. Record order defines each movie's index.
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let content = read_artifact(path)?;
    let file = file_name(path);

    if is_json(path) {
        return serde_json::from_str(&content).map_err(|source| DataLoadError::Json { file, source });
    }
    parse_movie_lines(&content, &file)
}

/// Parse the similarity artifact into rows.
pub fn parse_similarity(path: &Path) -> Result<Vec<Vec<f32>>> {
    let content = read_artifact(path)?;
    let file = file_name(path);

    if is_json(path) {
        return serde_json::from_str(&content).map_err(|source| DataLoadError::Json { file, source });
    }
    parse_similarity_lines(&content, &file)
}

/// Format: `movieId::title`, or just `title`
fn parse_movie_lines(content: &str, file: &str) -> Result<Vec<Movie>> {
    let mut movies = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let movie = match line_trimmed.split_once("::") {
            Some((movie_id, title)) => {
                let movie_id = movie_id.trim().parse().map_err(|e| DataLoadError::ParseError {
                    file: file.to_string(),
                    line: line_no,
                    reason: format!("Invalid movieId: {}", e),
                })?;
                let title = title.trim();
                if title.is_empty() {
                    return Err(DataLoadError::ParseError {
                        file: file.to_string(),
                        line: line_no,
                        reason: "Missing title".to_string(),
                    });
                }
                Movie::with_id(movie_id, title)
            }
            None => Movie::new(line_trimmed),
        };

        movies.push(movie);
    }

    Ok(movies)
}

/// One row per line; every row must have as many scores as the first one
fn parse_similarity_lines(content: &str, file: &str) -> Result<Vec<Vec<f32>>> {
    let mut rows: Vec<Vec<f32>> = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let row = line_trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .map(|field| {
                field.parse::<f32>().map_err(|e| DataLoadError::ParseError {
                    file: file.to_string(),
                    line: line_no,
                    reason: format!("Invalid score '{}': {}", field, e),
                })
            })
            .collect::<Result<Vec<f32>>>()?;

        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(DataLoadError::ParseError {
                    file: file.to_string(),
                    line: line_no,
                    reason: format!("Expected {} scores but found {}", first.len(), row.len()),
                });
            }
        }

        rows.push(row);
    }

    Ok(rows)
}
