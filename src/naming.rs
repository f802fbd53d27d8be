//! Output artifact naming.
//!
//! The user supplies a base filename; the artifact is always `<base>.pdf`.
//! Characters that are not safe in a file name on common filesystems are
//! replaced with `_`, so the name can never escape the output directory:
//!
//! - `"Obra Norte"` → `"Obra Norte.pdf"`
//! - `"informe.pdf"` → `"informe.pdf"` (extension not doubled)
//! - `"../../etc/x"` → `"_.._etc_x.pdf"`
//! - `"???"` → `"___.pdf"`
//! - `"..."` → `"Registro_Fotografico.pdf"` (nothing usable left)
//!
//! A blank base name is rejected by the export pipeline before naming runs;
//! the fallback only covers names that sanitize down to nothing.

/// Base name used when the supplied one has no usable characters.
pub const DEFAULT_BASE_NAME: &str = "Registro_Fotografico";

/// Extension of every produced document, without the dot.
pub const ARTIFACT_EXTENSION: &str = "pdf";

/// Result of turning a user-supplied base name into a file name.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactName {
    /// Sanitized base name, extension excluded.
    pub base: String,
    /// `base` plus the extension.
    pub file_name: String,
    /// True when the input had nothing usable and [`DEFAULT_BASE_NAME`] was used.
    pub defaulted: bool,
}

fn is_unsafe(c: char) -> bool {
    c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

/// Build the artifact file name for `base`.
pub fn artifact_name(base: &str) -> ArtifactName {
    let mut stem = base.trim();
    let suffix = format!(".{ARTIFACT_EXTENSION}");
    if stem.len() > suffix.len() && stem.to_ascii_lowercase().ends_with(&suffix) {
        stem = &stem[..stem.len() - suffix.len()];
    }

    let cleaned: String = stem
        .chars()
        .map(|c| if is_unsafe(c) { '_' } else { c })
        .collect();
    // Leading dots would make a hidden file (or `..`).
    let cleaned = cleaned.trim_start_matches(['.', ' ']).trim_end().to_string();

    let (base, defaulted) = if cleaned.is_empty() {
        (DEFAULT_BASE_NAME.to_string(), true)
    } else {
        (cleaned, false)
    };
    ArtifactName {
        file_name: format!("{base}.{ARTIFACT_EXTENSION}"),
        base,
        defaulted,
    }
}
