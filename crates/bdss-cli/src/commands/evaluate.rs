use super::load_workflow;
use crate::cli::EvaluateArgs;
use crate::error::Result;
use bdss::core::data::value::{DataValue, Value};
use bdss::engine::registry::FactoryRegistry;
use bdss::workflows;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

pub async fn run(args: EvaluateArgs) -> Result<()> {
    let workflow = load_workflow(&args.workflow)?;

    info!("Reading parameter values from standard input...");
    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    let values = parse_values(&input);
    debug!("Parsed {} parameter value(s): {:?}", values.len(), values);

    let registry = FactoryRegistry::with_builtins();
    let kpis = tokio::task::block_in_place(|| {
        workflows::evaluate::run(&workflow, &registry, &values)
    })?;

    println!("{}", format_kpis(&kpis));
    Ok(())
}

/// One value per whitespace-separated token, in parameter order.
fn parse_values(input: &str) -> Vec<Value> {
    input.split_whitespace().map(Value::parse_token).collect()
}

fn format_kpis(kpis: &[DataValue]) -> String {
    kpis.iter()
        .map(|kpi| kpi.value.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
