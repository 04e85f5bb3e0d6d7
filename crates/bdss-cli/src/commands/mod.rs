pub mod evaluate;
pub mod run;
pub mod validate;

use crate::error::{CliError, Result};
use bdss::core::io::workflow_file::WorkflowFile;
use bdss::engine::workflow::Workflow;
use std::path::Path;
use tracing::info;

fn load_workflow(path: &Path) -> Result<Workflow> {
    info!("Loading workflow from {:?}", path);
    WorkflowFile::read_from_path(path).map_err(|source| CliError::Workflow {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use bdss::core::io::workflow_file::WorkflowFile;
    use bdss::core::mco::kpi::KpiSpecification;
    use bdss::core::mco::model::McoModel;
    use bdss::core::mco::parameter::McoParameter;
    use bdss::core::stage::DataSourceModel;
    use bdss::engine::layer::ExecutionLayer;
    use bdss::engine::workflow::Workflow;
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// `cost = 2x + 1` over x in [0, 2], explored on a grid.
    pub fn linear_workflow() -> Workflow {
        Workflow::new()
            .with_mco_model(
                McoModel::new("aposteriori")
                    .with_parameter(McoParameter::listed("x", "NUMBER", vec![0.0, 1.0, 2.0]))
                    .with_kpi(KpiSpecification::minimise("cost"))
                    .with_setting("optimizer", json!("grid")),
            )
            .with_layer(
                ExecutionLayer::new().with_data_source(
                    DataSourceModel::new("linear")
                        .with_inputs(&["x"])
                        .with_outputs(&["cost"])
                        .with_setting("slope", json!(2.0))
                        .with_setting("intercept", json!(1.0)),
                ),
            )
    }

    pub fn write_workflow(workflow: &Workflow) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workflow.json");
        WorkflowFile::write_to_path(workflow, &path).unwrap();
        (dir, path)
    }
}
