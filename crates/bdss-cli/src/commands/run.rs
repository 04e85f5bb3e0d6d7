use super::load_workflow;
use crate::cli::RunArgs;
use crate::config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use bdss::engine::control::ControlChannel;
use bdss::engine::error::EngineError;
use bdss::engine::events::EventReporter;
use bdss::engine::registry::FactoryRegistry;
use bdss::optimizer::base::OptimalPoint;
use bdss::workflows;
use tracing::{info, warn};

pub async fn run(args: RunArgs) -> Result<()> {
    let mut workflow = load_workflow(&args.workflow)?;

    info!("Merging MCO settings from config file and CLI arguments...");
    let settings = config::build_mco_settings(&args)?;
    if let Some(model) = workflow.mco_model.as_mut() {
        config::apply_to_model(&settings, model)?;
    }

    let registry = FactoryRegistry::with_builtins();
    let control = ControlChannel::new();
    let progress_handler = CliProgressHandler::new(!args.no_points);
    let reporter = EventReporter::new().with_listener(progress_handler.get_listener());

    let interrupt_control = control.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping after the current evaluation.");
            interrupt_control.stop();
        }
    });

    println!("Starting optimization...");
    let result = tokio::task::block_in_place(|| {
        workflows::optimize::run(&workflow, &registry, &reporter, &control)
    });
    interrupt.abort();

    match result {
        Ok(points) => {
            info!("Workflow finished, received {} point(s).", points.len());
            print_summary(&points);
            Ok(())
        }
        Err(EngineError::Cancelled) => {
            warn!("Optimization was stopped before completion.");
            println!("Optimization stopped. Points printed above were found before the stop.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_summary(points: &[OptimalPoint]) {
    if points.is_empty() {
        warn!("Optimization completed but produced no points.");
        println!("Warning: the optimizer produced no points.");
    } else {
        println!("Optimization complete: {} optimal point(s).", points.len());
    }
}
