//! Queue environment splicing for CloudFormation farm templates
//!
//! A farm template marks where the queue environment goes with a pair of
//! comment lines. Everything between them is replaced by the queue
//! environment, indented like the start marker:
//!
//! ```yaml
//!       QueueEnvironment:
//!         ### START_QUEUE_ENV
//!         (replaced)
//!         ### END_QUEUE_ENV
//! ```
//!
//! The queue environment's `default: "deadline-cloud"` channel default is
//! rewritten to the requested channels first.

use std::fs;
use std::path::Path;

use log::info;

use crate::error::{LayerJobError, Result};
use crate::template::io::replace_file;

pub const START_MARKER: &str = "### START_QUEUE_ENV";

pub const END_MARKER: &str = "### END_QUEUE_ENV";

/// Channel default the queue environment must contain.
pub const CHANNELS_DEFAULT: &str = "default: \"deadline-cloud\"";

/// Splice `queue_env` into `cfn_template` with `channels` as the channel
/// default. The result always ends with a newline.
pub fn apply_queue_env(cfn_template: &str, queue_env: &str, channels: &str) -> Result<String> {
    if !queue_env.contains(CHANNELS_DEFAULT) {
        return Err(LayerJobError::Splice {
            reason: format!("queue environment does not contain '{}'", CHANNELS_DEFAULT),
        });
    }
    let quoted = serde_json::to_string(channels)?;
    let queue_env = queue_env.replace(CHANNELS_DEFAULT, &format!("default: {}", quoted));

    let starts = cfn_template.matches(START_MARKER).count();
    let ends = cfn_template.matches(END_MARKER).count();
    if starts != 1 || ends != 1 {
        return Err(LayerJobError::Splice {
            reason: format!(
                "template contains {} copies of '{}' and {} copies of '{}', it must contain one of each",
                starts, START_MARKER, ends, END_MARKER
            ),
        });
    }

    let mut output: Vec<String> = Vec::new();
    let mut skipping = false;
    for line in cfn_template.lines() {
        if skipping {
            if line.contains(END_MARKER) {
                skipping = false;
            } else {
                continue;
            }
        }

        output.push(line.to_string());
        if let Some((prefix, _)) = line.split_once(START_MARKER) {
            output.extend(queue_env.lines().map(|l| format!("{}{}", prefix, l)));
            skipping = true;
        }
    }
    output.push(String::new());

    Ok(output.join("\n"))
}

/// Splice a queue environment file into a template file in place.
pub fn apply_queue_env_file(cfn_path: &Path, queue_env_path: &Path, channels: &str) -> Result<()> {
    let cfn_template = read_text(cfn_path)?;
    let queue_env = read_text(queue_env_path)?;

    let spliced = apply_queue_env(&cfn_template, &queue_env, channels)?;
    replace_file(cfn_path, &spliced)?;

    info!(
        "Wrote queue environment {} into {}",
        queue_env_path.display(),
        cfn_path.display()
    );
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(LayerJobError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    fs::read_to_string(path).map_err(|e| LayerJobError::FileReadError {
        path: path.to_path_buf(),
        source: e,
    })
}
