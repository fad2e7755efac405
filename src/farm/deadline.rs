//! `deadline` command-line bridge
//!
//! Runs the render farm's CLI as a blocking subprocess. List commands print
//! YAML sequences of API summaries, which are parsed here into the farm
//! types.

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use super::model::{
    FarmDirectory, FarmInfo, FleetAttribute, JobSubmitter, QueueInfo, SubmitRequest,
};
use crate::error::{LayerJobError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFarm {
    farm_id: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQueue {
    queue_id: String,
    display_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFleet {
    #[serde(default)]
    configuration: Option<RawFleetConfiguration>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFleetConfiguration {
    #[serde(default)]
    customer_managed: Option<RawCustomerManaged>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCustomerManaged {
    #[serde(default)]
    worker_capabilities: Option<RawWorkerCapabilities>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWorkerCapabilities {
    #[serde(default)]
    custom_attributes: Vec<RawCustomAttribute>,
}

#[derive(Debug, Deserialize)]
struct RawCustomAttribute {
    name: String,
    #[serde(default)]
    values: Vec<String>,
}

fn parse_list<T: serde::de::DeserializeOwned>(text: &str) -> Result<Option<Vec<T>>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(serde_yaml::from_str(text)?)
}

/// Parse `deadline farm list` output.
pub fn parse_farms(text: &str) -> Result<Vec<FarmInfo>> {
    let raw: Option<Vec<RawFarm>> = parse_list(text)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|f| FarmInfo {
            farm_id: f.farm_id,
            display_name: f.display_name,
        })
        .collect())
}

/// Parse `deadline queue list` output.
pub fn parse_queues(text: &str) -> Result<Vec<QueueInfo>> {
    let raw: Option<Vec<RawQueue>> = parse_list(text)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|q| QueueInfo {
            queue_id: q.queue_id,
            display_name: q.display_name,
        })
        .collect())
}

/// Parse `deadline fleet list` output into the custom attributes of
/// customer-managed fleets. Fleets without custom attributes contribute
/// nothing; attributes without values are skipped.
pub fn parse_fleet_attributes(text: &str) -> Result<Vec<FleetAttribute>> {
    let raw: Option<Vec<RawFleet>> = parse_list(text)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|fleet| fleet.configuration?.customer_managed?.worker_capabilities)
        .flat_map(|caps| caps.custom_attributes)
        .filter_map(|attr| {
            let value = attr.values.into_iter().next()?;
            Some(FleetAttribute {
                attr_name: attr.name,
                attr_value: value,
            })
        })
        .collect())
}

/// The farm CLI, invoked as a subprocess.
#[derive(Debug, Clone)]
pub struct DeadlineCli {
    program: String,
}

impl Default for DeadlineCli {
    fn default() -> Self {
        Self::new("deadline")
    }
}

impl DeadlineCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the CLI and return stdout, or an error carrying stderr.
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| LayerJobError::FarmQuery {
                reason: format!("failed to run '{}': {}", self.program, e),
            })?;

        if !output.status.success() {
            return Err(LayerJobError::FarmQuery {
                reason: format!(
                    "'{} {}' exited with {}: {}",
                    self.program,
                    args.join(" "),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).replace('\r', ""))
    }

    fn list<T>(&self, what: &str, args: &[&str], parse: fn(&str) -> Result<Vec<T>>) -> Vec<T> {
        match self.run(args).and_then(|text| parse(&text)) {
            Ok(items) => {
                tracing::debug!("Listed {} {}", items.len(), what);
                items
            }
            Err(e) => {
                tracing::warn!("Could not list {}: {}", what, e);
                Vec::new()
            }
        }
    }

    /// Arguments of a `bundle submit` call.
    pub fn submit_args(request: &SubmitRequest) -> Vec<String> {
        vec![
            "bundle".to_string(),
            "submit".to_string(),
            "--yes".to_string(),
            "--priority".to_string(),
            request.priority.to_string(),
            "--max-failed-tasks-count".to_string(),
            request.job_retries.to_string(),
            "--max-retries-per-task".to_string(),
            request.task_retries.to_string(),
            "--farm-id".to_string(),
            request.farm_id.clone(),
            "--queue-id".to_string(),
            request.queue_id.clone(),
            path_arg(&request.template_dir),
        ]
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl FarmDirectory for DeadlineCli {
    fn list_farms(&self) -> Vec<FarmInfo> {
        self.list("farms", &["farm", "list"], parse_farms)
    }

    fn list_queues(&self, farm_id: &str) -> Vec<QueueInfo> {
        self.list(
            "queues",
            &["queue", "list", "--farm-id", farm_id],
            parse_queues,
        )
    }

    fn list_fleet_attributes(&self, farm_id: &str) -> Vec<FleetAttribute> {
        self.list(
            "fleet attributes",
            &["fleet", "list", "--farm-id", farm_id],
            parse_fleet_attributes,
        )
    }
}

impl JobSubmitter for DeadlineCli {
    fn submit(&self, request: &SubmitRequest) -> String {
        let args = Self::submit_args(request);
        tracing::info!("Running {} {}", self.program, args.join(" "));

        match Command::new(&self.program).args(&args).output() {
            Ok(output) => {
                let mut status = String::from_utf8_lossy(&output.stdout).replace('\r', "");
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr).replace('\r', "");
                    status.push_str(&format!(
                        "\nSubmission exited with {}\n{}",
                        output.status,
                        stderr.trim_end()
                    ));
                }
                status
            }
            Err(e) => format!("Failed to run '{}': {}", self.program, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_farms() {
        let text = "- farmId: farm-1\n  displayName: ProdFarm\n- farmId: farm-2\n  displayName: DevFarm\n";
        let farms = parse_farms(text).unwrap();
        assert_eq!(
            farms,
            vec![
                FarmInfo {
                    farm_id: "farm-1".to_string(),
                    display_name: "ProdFarm".to_string()
                },
                FarmInfo {
                    farm_id: "farm-2".to_string(),
                    display_name: "DevFarm".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_farms("").unwrap().is_empty());
        assert!(parse_queues("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_queues() {
        let text = "- queueId: queue-1\n  displayName: Render\n  status: IDLE\n";
        let queues = parse_queues(text).unwrap();
        assert_eq!(queues.len(), 1);
        assert_eq!(queues[0].queue_id, "queue-1");
    }

    #[test]
    fn test_parse_fleet_attributes() {
        let text = r#"
- fleetId: fleet-1
  configuration:
    customerManaged:
      workerCapabilities:
        customAttributes:
          - name: attr.worker.gpu
            values: [rtx4090, a100]
          - name: attr.worker.empty
            values: []
- fleetId: fleet-2
  configuration:
    serviceManagedEc2: {}
- fleetId: fleet-3
"#;
        let attrs = parse_fleet_attributes(text).unwrap();
        assert_eq!(
            attrs,
            vec![FleetAttribute {
                attr_name: "attr.worker.gpu".to_string(),
                attr_value: "rtx4090".to_string(),
            }]
        );
    }

    #[test]
    fn test_submit_args() {
        let request = SubmitRequest {
            priority: 50,
            job_retries: 20,
            task_retries: 5,
            template_dir: "/bundles/maya".into(),
            farm_id: "farm-1".to_string(),
            queue_id: "queue-1".to_string(),
        };
        let args = DeadlineCli::submit_args(&request).join(" ");
        assert_eq!(
            args,
            "bundle submit --yes --priority 50 --max-failed-tasks-count 20 \
             --max-retries-per-task 5 --farm-id farm-1 --queue-id queue-1 /bundles/maya"
        );
    }

    #[test]
    fn test_missing_program_degrades() {
        let cli = DeadlineCli::new("layerjob-no-such-deadline-binary");
        assert!(cli.list_farms().is_empty());
        assert!(cli.list_queues("farm-1").is_empty());

        let status = cli.submit(&SubmitRequest {
            priority: 50,
            job_retries: 1,
            task_retries: 1,
            template_dir: "/tmp".into(),
            farm_id: "f".to_string(),
            queue_id: "q".to_string(),
        });
        assert!(status.starts_with("Failed to run"));
    }
}
