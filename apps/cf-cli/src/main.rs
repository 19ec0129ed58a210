use cf_app::{
    AppError, AppResult, RunProgressEvent, SolveOverrides, SolveReport, SolveRequest,
    project_service, solve_service,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(about = "CanalFlow CLI - steady water levels in gated canal networks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project file (YAML, or JSON by extension)
        project_path: PathBuf,
    },
    /// List networks in a project
    Networks {
        /// Path to the project file
        project_path: PathBuf,
    },
    /// Solve steady levels and flows for one network
    Solve {
        /// Path to the project file
        project_path: PathBuf,
        /// Network ID to solve
        network_id: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Override the iteration budget
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Override the relaxation step in seconds
        #[arg(long)]
        dt_relax: Option<f64>,
        /// Override the level tolerance in meters
        #[arg(long)]
        tolerance: Option<f64>,
        /// Gate opening for this run, as GATE=VALUE (repeatable)
        #[arg(long = "opening", value_name = "GATE=VALUE")]
        openings: Vec<String>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Yaml,
    Json,
}

fn main() -> AppResult<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Networks { project_path } => cmd_networks(&project_path),
        Commands::Solve {
            project_path,
            network_id,
            format,
            max_iterations,
            dt_relax,
            tolerance,
            openings,
        } => {
            let overrides = SolveOverrides {
                max_iterations,
                dt_relax_s: dt_relax,
                tolerance_m: tolerance,
                openings: openings
                    .iter()
                    .map(|arg| solve_service::parse_opening(arg))
                    .collect::<AppResult<Vec<_>>>()?,
            };
            cmd_solve(&project_path, &network_id, format, overrides)
        }
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<ExitCode> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!("✓ Project is valid");
    Ok(ExitCode::SUCCESS)
}

fn cmd_networks(project_path: &Path) -> AppResult<ExitCode> {
    let project = project_service::load_project(project_path)?;
    let networks = project_service::list_networks(&project);

    if networks.is_empty() {
        println!("No networks found in project");
    } else {
        println!("Networks in project:");
        for net in networks {
            println!(
                "  {} - {} ({} nodes, {} fixed, {} gates{})",
                net.id,
                net.name,
                net.node_count,
                net.fixed_node_count,
                net.gate_count,
                if net.has_solver_override {
                    ", own solver settings"
                } else {
                    ""
                }
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_solve(
    project_path: &Path,
    network_id: &str,
    format: OutputFormat,
    overrides: SolveOverrides,
) -> AppResult<ExitCode> {
    debug!(network = network_id, ?overrides, "Solve requested");
    let request = SolveRequest {
        project_path,
        network_id,
        overrides,
        cancel: None,
    };

    let report = if format == OutputFormat::Text {
        let mut last_emit = Instant::now();
        let report = solve_service::run_solve_with_progress(
            &request,
            Some(&mut |event| {
                if event.iteration.is_none() || last_emit.elapsed().as_millis() >= 100 {
                    render_cli_progress(&event);
                    last_emit = Instant::now();
                }
            }),
        )?;
        clear_progress_line();
        report
    } else {
        solve_service::run_solve(&request)?
    };

    match format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Yaml => print!(
            "{}",
            serde_yaml::to_string(&report).map_err(|e| AppError::Project(e.to_string()))?
        ),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).map_err(|e| AppError::Project(e.to_string()))?
        ),
    }

    Ok(if report.converged {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn clear_progress_line() {
    eprint!("\r{}\r", " ".repeat(100));
    let _ = io::stderr().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(it) = &event.iteration {
        line.push_str(&format!(
            "  iter={}/{}  max_delta={:.3e} m",
            it.iteration, it.max_iterations, it.max_delta_m
        ));
    }
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    eprint!("{}", line);
    let _ = io::stderr().flush();
}

fn print_report(report: &SolveReport) {
    let mark = if report.converged { "✓" } else { "✗" };
    println!(
        "{} {} / {}: {} after {} iterations (max delta {:.3e} m)",
        mark,
        report.project,
        report.network_id,
        report.status,
        report.iterations,
        report.max_delta_m
    );
    println!(
        "  Settings: tolerance {} m, max {} iterations, dt_relax {} s",
        report.settings.tolerance_m, report.settings.max_iterations, report.settings.dt_relax_s
    );

    println!("\nNodes:");
    for node in &report.nodes {
        println!(
            "  {:<12} {:>10.4} m  {:>10.4} m3/s{}",
            node.id,
            node.level_m,
            node.imbalance_m3s,
            if node.fixed { "  (fixed)" } else { "" }
        );
    }

    println!("\nGates:");
    for gate in &report.gates {
        println!(
            "  {:<12} {:>8} -> {:<8} opening {:>4.2}  {:>10.4} m3/s",
            gate.id, gate.from_node_id, gate.to_node_id, gate.opening, gate.flow_m3s
        );
    }

    println!("\nTiming summary:");
    println!("  Compile: {:.3}s", report.timing.compile_time_s);
    println!("  Solve:   {:.3}s", report.timing.solve_time_s);
    println!("  Total:   {:.3}s", report.timing.total_time_s);
}
