//! Logical Path Handling
//!
//! Turns a raw request path into the logical path used both as the cache key
//! and as the suffix appended to the remote base directory.

use crate::error::{GatewayError, Result};

// == Logical Path ==
/// Percent-decodes and cleans a request path.
///
/// Empty and `.` segments are dropped and `..` pops a segment without ever
/// climbing above the root, so the result always starts with `/` and cannot
/// reach outside the configured base directory.
pub fn logical_path(raw: &str) -> Result<String> {
    let decoded = urlencoding::decode(raw)
        .map_err(|_| GatewayError::InvalidPath(raw.to_string()))?;

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    Ok(format!("/{}", segments.join("/")))
}

// == Remote Path ==
/// Joins the remote base directory and a logical path.
pub fn remote_path(base_dir: &str, logical: &str) -> String {
    format!("{}{}", base_dir.trim_end_matches('/'), logical)
}
