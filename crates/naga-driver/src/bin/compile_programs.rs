//! Offline shader program checker
//!
//! Compiles every program of a registry against the naga driver and prints
//! the diagnostics with line numbers pointing into the authored files.
//!
//! # Usage
//! ```bash
//! compile_programs --root shaders --manifest programs.yaml --config template.yaml
//! ```

use clap::Parser;
use serde::Serialize;
use shader_program::{ProgramCompiler, ProgramRegistry, ShaderDriver, StageType};
use shader_program_naga::{NagaDriver, naga_template_config};
use shader_program_template::{DirectorySource, TemplateConfig, standard_template};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

#[derive(Parser)]
#[command(version, about = "Compile shader programs and report their diagnostics")]
struct Args {
    /// Directory shader paths such as /gpu/vert.glsl are resolved against
    #[arg(long, short)]
    root: PathBuf,

    /// Program manifest YAML; the standard programs are used when omitted
    #[arg(long, short)]
    manifest: Option<PathBuf>,

    /// Template configuration YAML; defaults to the standard values with `#version 450`
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Directive emitted for <version_header>, overriding the configuration
    #[arg(long)]
    version_header: Option<String>,

    /// Print a JSON report instead of plain diagnostics
    #[arg(long)]
    json: bool,
}

/// Outcome of compiling one program
#[derive(Debug, Serialize)]
struct ProgramReport {
    name: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<StageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = tracing_subscriber::fmt().with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let registry = match &args.manifest {
        Some(path) => ProgramRegistry::from_file(path)?,
        None => ProgramRegistry::standard(),
    };
    let mut config = match &args.config {
        Some(path) => TemplateConfig::from_file(path)?,
        None => naga_template_config(),
    };
    if let Some(version_header) = args.version_header {
        config.version_header = version_header;
        config.validate()?;
    }
    let template = standard_template(&config, DirectorySource::new(&args.root));

    let mut compiler = ProgramCompiler::new(NagaDriver::new());
    let mut reports = Vec::with_capacity(registry.len());
    for (name, descriptor) in registry.iter() {
        match compiler.compile(descriptor, &template) {
            Ok(program) => {
                info!(program = name, handle = %program, "program compiled");
                compiler.driver_mut().delete_program(program);
                reports.push(ProgramReport {
                    name: name.to_string(),
                    success: true,
                    stage: None,
                    source: None,
                    error: None,
                });
            }
            Err(err) => {
                error!(program = name, stage = ?err.stage(), source = err.source_id(), "program failed to compile");
                reports.push(ProgramReport {
                    name: name.to_string(),
                    success: false,
                    stage: err.stage(),
                    source: err.source_id().map(str::to_string),
                    error: Some(err.to_string()),
                });
            }
        }
    }

    let failures = reports.iter().filter(|report| !report.success).count();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in reports.iter().filter(|report| !report.success) {
            match (&report.stage, &report.source) {
                (Some(stage), Some(source)) => println!("{} ({stage} stage, {source}):", report.name),
                _ => println!("{}:", report.name),
            }
            println!("{}", report.error.as_deref().unwrap_or_default());
        }
        println!("{} of {} programs compiled", reports.len() - failures, reports.len());
    }

    if failures > 0 {
        process::exit(1);
    }
    Ok(())
}
