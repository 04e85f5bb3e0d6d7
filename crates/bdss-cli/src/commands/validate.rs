use super::load_workflow;
use crate::cli::ValidateArgs;
use crate::error::{CliError, Result};
use bdss::engine::registry::FactoryRegistry;
use bdss::engine::verifier::{self, VerifierError};
use tracing::info;

pub async fn run(args: ValidateArgs) -> Result<()> {
    let workflow = load_workflow(&args.workflow)?;
    let registry = FactoryRegistry::with_builtins();

    let findings = verifier::verify(&workflow, &registry)?;
    info!("Verification produced {} finding(s).", findings.len());

    for finding in &findings {
        println!("{}", finding);
    }

    let failures = count_failures(&findings, args.strict);
    if failures > 0 {
        return Err(CliError::Invalid(failures));
    }
    println!("✓ Workflow is valid ({} warning(s)).", findings.len());
    Ok(())
}

/// Findings that fail validation: errors, plus warnings when `strict`.
fn count_failures(findings: &[VerifierError], strict: bool) -> usize {
    findings.iter().filter(|f| strict || f.is_error()).count()
}
