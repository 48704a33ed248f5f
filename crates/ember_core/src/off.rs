//! OFF (Object File Format) polygon mesh parsing.
//!
//! Supported layout:
//!
//! ```text
//! OFF                 # optional magic line
//! 4 2 0               # vertex count, face count, optional edge count
//! 0.0 0.0 0.0         # one line per vertex
//! ...
//! 3 0 1 2             # one line per face: vertex count then indices
//! 4 0 1 2 3           # quads are split into two triangles
//! ```
//!
//! Blank lines and `#` comments are ignored. Faces with anything other than
//! three or four vertices are rejected. Values after a face's indices (per-face
//! colors) are ignored.

use std::path::Path;

use ember_math::Vec3;
use thiserror::Error;

use crate::mesh::Mesh;

/// Errors that can occur during OFF parsing.
#[derive(Error, Debug)]
pub enum OffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid OFF header at line {line}: {message}")]
    Header { line: usize, message: String },

    #[error("Invalid number '{token}' at line {line}")]
    InvalidNumber { line: usize, token: String },

    #[error("Unsupported face with {count} vertices at line {line} (expected 3 or 4)")]
    UnsupportedFace { line: usize, count: usize },

    #[error("Face at line {line} references vertex {index}, but only {vertex_count} exist")]
    IndexOutOfRange {
        line: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Unexpected end of file: expected {expected} more {what}")]
    UnexpectedEof { expected: usize, what: &'static str },
}

/// Result type for OFF operations.
pub type OffResult<T> = Result<T, OffError>;

/// Load an OFF file from disk.
pub fn load_off<P: AsRef<Path>>(path: P) -> OffResult<Mesh> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let mesh = parse_off(&content)?;
    log::info!(
        "Loaded {}: {} vertices, {} triangles",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Parse OFF content into a triangle mesh.
pub fn parse_off(content: &str) -> OffResult<Mesh> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, strip_comment(line).trim()))
        .filter(|(_, line)| !line.is_empty());

    let (mut line_num, mut header) = lines.next().ok_or(OffError::UnexpectedEof {
        expected: 1,
        what: "header line",
    })?;

    // The magic may stand alone or prefix the counts on the same line
    if let Some(rest) = header.strip_prefix("OFF") {
        header = rest.trim();
        if header.is_empty() {
            (line_num, header) = lines.next().ok_or(OffError::UnexpectedEof {
                expected: 1,
                what: "count line",
            })?;
        }
    }

    let counts = parse_numbers::<usize>(header, line_num)?;
    if counts.len() < 2 || counts.len() > 3 {
        return Err(OffError::Header {
            line: line_num,
            message: format!("expected 'vertices faces [edges]', got '{}'", header),
        });
    }
    let (vertex_count, face_count) = (counts[0], counts[1]);

    // Counts are untrusted; a short file is reported by the reads below
    let mut positions = Vec::new();
    for remaining in (1..=vertex_count).rev() {
        let (line, text) = lines.next().ok_or(OffError::UnexpectedEof {
            expected: remaining,
            what: "vertices",
        })?;
        let coords = parse_numbers::<f32>(text, line)?;
        if coords.len() < 3 {
            return Err(OffError::Header {
                line,
                message: format!("vertex needs 3 coordinates, got {}", coords.len()),
            });
        }
        positions.push(Vec3::new(coords[0], coords[1], coords[2]));
    }

    let mut indices = Vec::new();
    for remaining in (1..=face_count).rev() {
        let (line, text) = lines.next().ok_or(OffError::UnexpectedEof {
            expected: remaining,
            what: "faces",
        })?;
        let mut tokens = text.split_whitespace();
        let Some(count) = tokens.next() else {
            continue;
        };
        let count = parse_number::<usize>(count, line)?;
        // Anything after the indices is a per-face color and is skipped
        let face = tokens
            .take(count)
            .map(|token| parse_number::<u32>(token, line))
            .collect::<OffResult<Vec<u32>>>()?;
        if face.len() < count {
            return Err(OffError::UnexpectedEof {
                expected: count - face.len(),
                what: "face indices",
            });
        }

        if let Some(&index) = face.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(OffError::IndexOutOfRange {
                line,
                index,
                vertex_count,
            });
        }

        match face[..] {
            [a, b, c] => indices.extend_from_slice(&[a, b, c]),
            [a, b, c, d] => indices.extend_from_slice(&[a, b, c, a, c, d]),
            _ => return Err(OffError::UnsupportedFace { line, count }),
        }
    }

    Ok(Mesh::new(positions, indices))
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_number<T: std::str::FromStr>(token: &str, line: usize) -> OffResult<T> {
    token.parse::<T>().map_err(|_| OffError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}

fn parse_numbers<T: std::str::FromStr>(text: &str, line: usize) -> OffResult<Vec<T>> {
    text.split_whitespace()
        .map(|token| parse_number(token, line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TETRA: &str = "OFF
# a tetrahedron
4 4 6
0 0 0
1 0 0
0 1 0
0 0 1

3 0 1 2
3 0 1 3
3 0 2 3
3 1 2 3
";

    #[test]
    fn test_parse_triangles() {
        let mesh = parse_off(TETRA).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.positions[3], Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_quad_split_into_two_triangles() {
        let content = "OFF\n4 1 0\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n4 0 1 2 3\n";
        let mesh = parse_off(content).unwrap();

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_header_without_magic() {
        let content = "3 1\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
        let mesh = parse_off(content).unwrap();

        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_counts_on_magic_line() {
        let content = "OFF 3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2 255 0 0\n";
        let mesh = parse_off(content).unwrap();

        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_unsupported_face() {
        let content = "OFF\n5 1 0\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n0 2 0\n5 0 1 2 3 4\n";

        assert!(matches!(
            parse_off(content),
            Err(OffError::UnsupportedFace { line: 8, count: 5 })
        ));
    }

    #[test]
    fn test_bad_header() {
        assert!(matches!(
            parse_off("OFF\n12\n"),
            Err(OffError::Header { line: 2, .. })
        ));
        assert!(matches!(
            parse_off("OFF\nfour 1 0\n"),
            Err(OffError::InvalidNumber { line: 2, .. })
        ));
    }

    #[test]
    fn test_truncated_file() {
        let content = "OFF\n3 1 0\n0 0 0\n1 0 0\n";

        assert!(matches!(
            parse_off(content),
            Err(OffError::UnexpectedEof {
                expected: 1,
                what: "vertices"
            })
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        let content = "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 9\n";

        assert!(matches!(
            parse_off(content),
            Err(OffError::IndexOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn test_float_face_colors_are_skipped() {
        let content = "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2 0.9 0.2 0.1\n";
        let mesh = parse_off(content).unwrap();

        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_huge_header_counts_fail_cleanly() {
        let content = "OFF\n3 6148914691236517206 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
        assert!(matches!(
            parse_off(content),
            Err(OffError::UnexpectedEof { what: "faces", .. })
        ));

        let content = "OFF\n18446744073709551615 1 0\n0 0 0\n";
        assert!(matches!(
            parse_off(content),
            Err(OffError::UnexpectedEof { what: "vertices", .. })
        ));
    }
}
