//! Embedded script patching
//!
//! The per-step init script is opaque text that carries three tagged lines:
//!
//! ```text
//! render_layer: <name>
//! image_width: <pixels>
//! image_height: <pixels>
//! ```
//!
//! Patching reads the current value from the tagged line and then replaces
//! the first occurrence of that value text anywhere in the script. This
//! keeps the output byte-compatible with templates written by earlier
//! submitters. If the old value also appears *before* the tagged line, that
//! earlier text is the one rewritten.

use std::fmt;

use regex::Regex;

use crate::error::{LayerJobError, Result};

/// Tagged fields of the embedded script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptField {
    RenderLayer,
    ImageWidth,
    ImageHeight,
}

impl ScriptField {
    /// The tag as written in the script.
    pub fn tag(&self) -> &'static str {
        match self {
            ScriptField::RenderLayer => "render_layer",
            ScriptField::ImageWidth => "image_width",
            ScriptField::ImageHeight => "image_height",
        }
    }

    fn pattern(&self) -> Result<Regex> {
        // the tagged line starts the blob or follows a newline; the value runs
        // to the end of that line
        let pattern = format!(r"(?:^|\n){}: ([^\r\n]*)", regex::escape(self.tag()));
        Regex::new(&pattern).map_err(|e| LayerJobError::Patch {
            field: self.tag().to_string(),
            reason: format!("invalid pattern: {}", e),
        })
    }
}

impl fmt::Display for ScriptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Current value of a tagged field, if its line is present.
pub fn field_value(blob: &str, field: ScriptField) -> Result<Option<&str>> {
    let re = field.pattern()?;
    Ok(re
        .captures(blob)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str()))
}

/// Rewrite one tagged field of an embedded script.
///
/// Fails when the field line is missing; an unpatched script would render
/// the wrong layer or resolution.
pub fn patch(blob: &str, field: ScriptField, new_value: &str) -> Result<String> {
    let re = field.pattern()?;

    let Some(current) = re.captures(blob).and_then(|caps| caps.get(1)) else {
        return Err(LayerJobError::Patch {
            field: field.tag().to_string(),
            reason: format!("no '{}: ' line in embedded script", field.tag()),
        });
    };

    if current.as_str().is_empty() {
        // nothing to key a substring replace on, write into the tagged line
        let mut patched = String::with_capacity(blob.len() + new_value.len());
        patched.push_str(&blob[..current.start()]);
        patched.push_str(new_value);
        patched.push_str(&blob[current.start()..]);
        return Ok(patched);
    }

    Ok(blob.replacen(current.as_str(), new_value, 1))
}

/// Apply several field patches in order.
pub fn patch_fields(blob: &str, patches: &[(ScriptField, &str)]) -> Result<String> {
    patches
        .iter()
        .try_fold(blob.to_string(), |text, (field, value)| {
            patch(&text, *field, value)
        })
}
