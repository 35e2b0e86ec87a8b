//! File-backed parameter source.
//!
//! Builds the `LaunchPipelineExecution` variables from a run-config JSON file plus the
//! selector, mode and tags given on the command line. The file is re-read on every call,
//! so edits made between activations are picked up.

use crate::launch::ParameterSource;
use crate::model::ParameterSet;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionTag {
    pub key: String,
    pub value: String,
}

impl ExecutionTag {
    /// Parse `key=value`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok(Self {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            }),
            _ => Err(format!("expected key=value, got {raw:?}")),
        }
    }
}

pub(crate) struct VariablesFile {
    pub path: PathBuf,
    pub pipeline_name: String,
    pub mode: String,
    pub solid_subset: Option<Vec<String>>,
    pub tags: Vec<ExecutionTag>,
}

impl VariablesFile {
    fn read_config(&self) -> Option<Value> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "run config not readable");
                return None;
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(v) if v.is_object() => Some(v),
            Ok(_) => {
                tracing::warn!(path = %self.path.display(), "run config must be a JSON object");
                None
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "run config is not valid JSON");
                None
            }
        }
    }
}

impl ParameterSource for VariablesFile {
    fn get_variables(&self) -> Option<ParameterSet> {
        let config = self.read_config()?;
        Some(ParameterSet::new(json!({
            "executionParams": {
                "selector": {
                    "name": self.pipeline_name,
                    "solidSubset": self.solid_subset,
                },
                "mode": self.mode,
                "environmentConfigData": config,
                "executionMetadata": {
                    "tags": self.tags,
                },
            }
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "pipeline-launch-{}-{}.json",
            name,
            std::process::id()
        ))
    }

    fn source(path: PathBuf) -> VariablesFile {
        VariablesFile {
            path,
            pipeline_name: "my_pipeline".into(),
            mode: "default".into(),
            solid_subset: None,
            tags: vec![ExecutionTag {
                key: "team".into(),
                value: "data".into(),
            }],
        }
    }

    #[test]
    fn missing_file_is_not_ready() {
        assert!(source(temp_path("missing")).get_variables().is_none());
    }

    #[test]
    fn invalid_json_is_not_ready() {
        let path = temp_path("invalid");
        std::fs::write(&path, "{ solids: ").unwrap();
        assert!(source(path.clone()).get_variables().is_none());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn builds_execution_params_from_file() {
        let path = temp_path("valid");
        std::fs::write(&path, r#"{"solids": {"sum": {"inputs": {"num": 2}}}}"#).unwrap();

        let params = source(path.clone()).get_variables().unwrap();
        let v = params.as_value();
        assert_eq!(v["executionParams"]["selector"]["name"], "my_pipeline");
        assert!(v["executionParams"]["selector"]["solidSubset"].is_null());
        assert_eq!(v["executionParams"]["mode"], "default");
        assert_eq!(
            v["executionParams"]["environmentConfigData"]["solids"]["sum"]["inputs"]["num"],
            2
        );
        assert_eq!(
            v["executionParams"]["executionMetadata"]["tags"][0]["key"],
            "team"
        );
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn file_is_reread_on_each_call() {
        let path = temp_path("reread");
        let src = source(path.clone());
        assert!(src.get_variables().is_none());

        std::fs::write(&path, "{}").unwrap();
        assert!(src.get_variables().is_some());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn tag_parsing() {
        assert_eq!(
            ExecutionTag::parse("owner = ops").unwrap(),
            ExecutionTag {
                key: "owner".into(),
                value: "ops".into()
            }
        );
        assert!(ExecutionTag::parse("novalue").is_err());
        assert!(ExecutionTag::parse("=x").is_err());
    }
}
