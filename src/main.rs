//! dwiflow CLI - assemble diffusion preprocessing workflows.
//!
//! Prints derived names, assembled workflows and the built-in interfaces.
//! Set `RUST_LOG=debug` to trace every node and connection.

use anyhow::{bail, Context, Result};
use dwiflow::prelude::*;
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("dwiflow");

    let Some(command) = args.get(1) else {
        print_usage(program);
        return Ok(());
    };

    match command.as_str() {
        "name" => {
            let Some(path) = args.get(2) else {
                bail!("Please specify a DWI file. Usage: {} name <path>", program);
            };
            println!("{}", derive_name(path)?);
        }
        "build" => {
            if args.len() < 3 {
                bail!(
                    "Please specify a DWI file. Usage: {} build <dwi_file> [--config <file.toml>] [--json]",
                    program
                );
            }
            build(&args[2..])?;
        }
        "interfaces" => list_interfaces(),
        "help" | "--help" | "-h" => print_usage(program),
        other => {
            print_usage(program);
            bail!("Unknown command: {}", other);
        }
    }

    Ok(())
}

fn print_usage(program: &str) {
    println!("dwiflow v{}", dwiflow::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  name <path>                 Print the workflow name derived from a DWI file");
    println!("  build <dwi_file> [options]  Assemble and validate the preprocessing workflow");
    println!("  interfaces                  List the built-in interfaces");
    println!("  help                        Show this help message");
    println!();
    println!("Build options:");
    println!("  --config <file.toml>  Load omp_nthreads, work_dir and bids_dir from TOML");
    println!("  --json                Print the assembled workflow as JSON");
}

fn build(args: &[String]) -> Result<()> {
    let dwi_file = PathBuf::from(&args[0]);
    let mut config_path: Option<PathBuf> = None;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                config_path = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--json" => {
                json = true;
                i += 1;
            }
            other => bail!("Unknown build option: {}", other),
        }
    }

    let config = match &config_path {
        Some(path) => BuildConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => BuildConfig::default(),
    };

    let workflow = init_dwi_preproc_wf(&dwi_file, &config)
        .with_context(|| format!("assembling workflow for {}", dwi_file.display()))?;
    let report = ValidationPipeline::default().validate(&workflow);

    if json {
        println!("{}", SerializedWorkflow::from_workflow(&workflow).to_json()?);
    } else {
        print_workflow(&workflow);
    }

    eprintln!("{}", report.summary());
    for line in report.detailed_errors() {
        eprintln!("{}", line);
    }
    for warning in &report.warnings {
        match &warning.node_path {
            Some(path) => log::warn!("{}: {}", path, warning.message),
            None => log::warn!("{}", warning.message),
        }
    }

    if !report.can_execute() {
        bail!("workflow '{}' failed validation", workflow.name());
    }
    Ok(())
}

fn print_workflow(workflow: &Workflow) {
    println!("Workflow: {} ({})", workflow.name(), workflow.id());
    println!();
    println!("Nodes:");
    for path in workflow.node_paths() {
        let depth = path.matches('.').count();
        println!("  {}{}", "  ".repeat(depth), path);
    }
    println!();
    println!("Connections:");
    for conn in workflow.connections() {
        println!("  {}", conn);
    }
}

fn list_interfaces() {
    let registry = InterfaceRegistry::with_builtins();

    println!("Available interfaces ({} total):", registry.len());
    println!();

    for (category, interfaces) in registry.grouped_by_category() {
        println!("  {}", category.display_name());
        for metadata in interfaces {
            println!("      {} - {}", metadata.id, metadata.description);
            println!("        in:  {}", metadata.input_names().join(", "));
            println!("        out: {}", metadata.output_names().join(", "));
        }
        println!();
    }
}
