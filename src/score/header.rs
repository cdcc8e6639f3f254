//! Reader and writer for the `ScoreData.h` reference format.
//!
//! The offline score pipeline emits the reference as a C header so the same
//! file can be compiled straight into firmware:
//!
//! ```text
//! #ifndef SCORE_DATA_H
//! #define SCORE_DATA_H
//!
//! const int num_pages = 2;
//! const int page_end_indices[] = { 120, 260 };
//!
//! const int score_len = 400;
//! const float score_chroma[][12] = {
//!   {1.0000f, 0.0000f, ...},
//!   ...
//! };
//!
//! #endif
//! ```
//!
//! `num_pages` counts page *boundaries* (turns), not pages.

use super::ReferenceProfile;
use crate::convert::N_CHROMA;
use crate::{Error, Result};
use ndarray::Array2;
use std::fmt::Write as _;
use std::path::Path;

/// Parse a `ScoreData.h` text into a validated reference profile.
///
/// `page_end_indices` and `score_chroma` are required. The declared
/// `num_pages` and `score_len` are cross-checked when present; a mismatch
/// is logged and the parsed data wins. Tokens inside the chroma block that
/// are not numbers are skipped, and a trailing partial row is dropped.
///
/// # Errors
/// `Error::ScoreFormat` for missing sections or no chroma data, plus any
/// validation error from [`ReferenceProfile::new`].
///
/// # Example
/// ```
/// use pageturner::score::parse_header;
///
/// let text = "const int num_pages = 1;\n\
///             const int page_end_indices[] = { 1 };\n\
///             const int score_len = 3;\n\
///             const float score_chroma[][12] = {\n\
///               {1.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f},\n\
///               {0.0f, 1.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f},\n\
///               {0.0f, 0.0f, 1.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f, 0.0f}\n\
///             };\n";
/// let profile = parse_header(text).unwrap();
/// assert_eq!(profile.len(), 3);
/// assert_eq!(profile.page_boundaries(), &[1]);
/// ```
pub fn parse_header(text: &str) -> Result<ReferenceProfile> {
    let text = strip_line_comments(text);

    let boundaries = int_array(&text, "page_end_indices")?;
    let values = chroma_values(&text)?;

    let n_frames = values.len() / N_CHROMA;
    if values.len() % N_CHROMA != 0 {
        log::warn!(
            "score_chroma holds {} values, not a multiple of {N_CHROMA}; dropping the partial row",
            values.len()
        );
    }
    if let Some(declared) = int_scalar(&text, "score_len") {
        if declared != n_frames {
            log::warn!("score_len = {declared}, but {n_frames} frames were parsed; using parsed data");
        }
    }
    if let Some(declared) = int_scalar(&text, "num_pages") {
        if declared != boundaries.len() {
            log::warn!(
                "num_pages = {declared}, but {} page_end_indices were found",
                boundaries.len()
            );
        }
    }
    if n_frames == 0 {
        return Err(Error::ScoreFormat("score_chroma contains no complete frame".into()));
    }

    // Stored row-major as (n_frames, 12); the profile wants one column per frame.
    let rows = Array2::from_shape_vec((n_frames, N_CHROMA), values[..n_frames * N_CHROMA].to_vec())
        .map_err(|e| Error::ScoreFormat(e.to_string()))?;
    let profile = ReferenceProfile::new(rows.t().to_owned(), boundaries)?;

    log::debug!(
        "loaded score: {} frames, {} page boundaries {:?}",
        profile.len(),
        profile.page_boundaries().len(),
        profile.page_boundaries()
    );
    Ok(profile)
}

/// Read and parse a `ScoreData.h` file.
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<ReferenceProfile> {
    let path = path.as_ref();
    log::debug!("reading score data from {}", path.display());
    let text = std::fs::read_to_string(path)?;
    parse_header(&text)
}

/// Render a profile in the `ScoreData.h` format (values to 4 decimals).
///
/// `comment`, when given, is written as a leading `//` line.
pub fn write_header(profile: &ReferenceProfile, comment: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(comment) = comment {
        let _ = writeln!(out, "// {comment}");
    }
    out.push_str("#ifndef SCORE_DATA_H\n#define SCORE_DATA_H\n\n");

    let bounds = profile.page_boundaries();
    let joined: Vec<String> = bounds.iter().map(|b| b.to_string()).collect();
    let _ = writeln!(out, "const int num_pages = {};", bounds.len());
    let _ = writeln!(out, "const int page_end_indices[] = {{ {} }};\n", joined.join(", "));

    let n = profile.len();
    let _ = writeln!(out, "const int score_len = {n};");
    out.push_str("const float score_chroma[][12] = {\n");
    for j in 0..n {
        let row: Vec<String> = profile.frame(j).iter().map(|v| format!("{v:.4}f")).collect();
        let comma = if j + 1 < n { "," } else { "" };
        let _ = writeln!(out, "  {{{}}}{comma}", row.join(", "));
    }
    out.push_str("};\n\n#endif\n");
    out
}

fn strip_line_comments(text: &str) -> String {
    text.lines()
        .map(|line| line.split_once("//").map_or(line, |(code, _)| code))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Value of `name = <digits>`, if declared.
fn int_scalar(text: &str, name: &str) -> Option<usize> {
    text.match_indices(name).find_map(|(at, _)| {
        let rest = text[at + name.len()..].trim_start();
        let rest = rest.strip_prefix('=')?.trim_start();
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        digits.parse().ok()
    })
}

/// Contents of `name[] = { a, b, c }`.
fn int_array(text: &str, name: &str) -> Result<Vec<usize>> {
    let body = text
        .match_indices(name)
        .find_map(|(at, _)| braced_after_declarator(&text[at + name.len()..]))
        .ok_or_else(|| Error::ScoreFormat(format!("array `{name}` not found")))?;

    body.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<usize>()
                .map_err(|_| Error::ScoreFormat(format!("`{name}` entry `{t}` is not an index")))
        })
        .collect()
}

/// Given the text right after an identifier, return the `{ ... }` body if
/// it is introduced by `[ ] =`.
fn braced_after_declarator(rest: &str) -> Option<&str> {
    let rest = rest.trim_start().strip_prefix('[')?.trim_start();
    let rest = rest.strip_prefix(']')?.trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();
    let rest = rest.strip_prefix('{')?;
    let end = rest.find('}')?;
    Some(&rest[..end])
}

/// All numbers between the first `{` after `score_chroma` and the last `}`.
fn chroma_values(text: &str) -> Result<Vec<f32>> {
    let start = text
        .find("score_chroma")
        .ok_or_else(|| Error::ScoreFormat("`score_chroma` not found".into()))?;
    let block = &text[start..];
    let (open, close) = match (block.find('{'), block.rfind('}')) {
        (Some(open), Some(close)) if open < close => (open, close),
        _ => return Err(Error::ScoreFormat("`score_chroma` has no initializer".into())),
    };

    let values: Vec<f32> = block[open..=close]
        .split(|c: char| c == ',' || c == '{' || c == '}' || c == ';' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .filter_map(|t| t.trim_end_matches(['f', 'F']).parse::<f32>().ok())
        .collect();

    if values.is_empty() {
        return Err(Error::ScoreFormat("`score_chroma` contains no values".into()));
    }
    Ok(values)
}
