use clap::{Parser, Subcommand};
use flowdraft::client::{HttpClient, RunLauncher, RuntimeInspector, StaticToken};
use flowdraft::config::Config;
use flowdraft::prelude::*;
use flowdraft::session::{format_json_object, parse_json_object};
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Validates, compiles and inspects workflow drafts saved by the editor
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Optional path to a JSON config file. Defaults plus FLOWDRAFT_* variables otherwise.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every validation problem of a snapshot
    Validate {
        /// Path to the editor snapshot JSON file
        snapshot_path: String,
    },
    /// Compile a snapshot into a workflow definition
    Compile {
        snapshot_path: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: String,
        /// Path to a JSON object used as the workflow's global map
        #[arg(short, long)]
        global: Option<String>,
        /// Write the definition here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the script declarations for one FUNCTION or GUARD task
    Contract {
        snapshot_path: String,
        /// Label or id of the task
        task: String,
        #[arg(short, long)]
        global: Option<String>,
    },
    /// Strip the types from a TypeScript task script
    Transpile { script_path: String },
    /// Start a run of a stored definition
    Run {
        definition_id: String,
        /// JSON object overriding the global map for this run
        #[arg(long)]
        overrides: Option<String>,
    },
    /// Show status and logs of a run
    Inspect { run_id: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    }
    .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e)));

    match cli.command {
        Command::Validate { snapshot_path } => run_validate(&snapshot_path),
        Command::Compile {
            snapshot_path,
            name,
            description,
            global,
            output,
        } => run_compile(&snapshot_path, name, description, global, output),
        Command::Contract {
            snapshot_path,
            task,
            global,
        } => run_contract(&snapshot_path, &task, global),
        Command::Transpile { script_path } => run_transpile(&script_path),
        Command::Run {
            definition_id,
            overrides,
        } => run_remote(&config, |client| async move {
            let overrides = parse_json_object(overrides.as_deref().unwrap_or(""))
                .unwrap_or_else(|e| exit_with_error(&format!("Invalid overrides: {}", e)));
            client
                .start_run(&definition_id, &overrides)
                .await
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to start run: {}", e)));
            println!("Started a run of '{}'", definition_id);
            if !overrides.is_empty() {
                println!("Global overrides:\n{}", format_json_object(&overrides));
            }
        }),
        Command::Inspect { run_id } => run_remote(&config, |client| async move {
            let run = client
                .fetch_run(&run_id)
                .await
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to fetch run: {}", e)));
            println!(
                "Run {} of '{}': {:?}",
                run.id, run.definition.name, run.workflow_status
            );
            for task in &run.tasks {
                println!("  {} [{}] {:?}", task.name, task.task_type, task.status);
                for line in run.logs_for(&task.name) {
                    println!("    {} {}", line.datetime, line.log);
                }
            }
        }),
    }
}

fn load_graph(snapshot_path: &str) -> Graph {
    let json = fs::read_to_string(snapshot_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read snapshot file '{}': {}",
            snapshot_path, e
        ))
    });
    UiSnapshot::from_json(&json)
        .and_then(UiSnapshot::into_graph)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load snapshot: {}", e)))
}

fn load_global(global_path: Option<String>) -> Params {
    let Some(path) = global_path else {
        return Params::new();
    };
    let json = fs::read_to_string(&path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read global map '{}': {}", path, e))
    });
    parse_json_object(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid global map '{}': {}", path, e)))
}

fn run_validate(snapshot_path: &str) {
    let graph = load_graph(snapshot_path);
    let report = standard().validate(&graph);
    println!("{}", ViolationFormatter::format_report(&report, &graph));
    if !report.is_valid() {
        std::process::exit(1);
    }
}

fn run_compile(
    snapshot_path: &str,
    name: String,
    description: String,
    global_path: Option<String>,
    output: Option<String>,
) {
    let graph = load_graph(snapshot_path);
    let mut metadata = WorkflowMetadata::new(name, description);
    metadata.global = load_global(global_path);

    let compile_start = Instant::now();
    let definition = match compile(&graph, &metadata) {
        Ok(definition) => definition,
        Err(CompileError::CompileOnInvalidGraph { .. }) => {
            let report = standard().validate(&graph);
            eprintln!("{}", ViolationFormatter::format_report(&report, &graph));
            exit_with_error("Compilation refused, the graph has validation problems.");
        }
        Err(e) => exit_with_error(&format!("Compilation failed: {}", e)),
    };
    tracing::info!(
        tasks = definition.tasks.len(),
        elapsed = ?compile_start.elapsed(),
        "Compiled workflow"
    );

    let json = serde_json::to_string_pretty(&definition)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize definition: {}", e)));
    match output {
        Some(path) => {
            fs::write(&path, json).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write '{}': {}", path, e))
            });
            println!("Wrote {} task(s) to '{}'", definition.tasks.len(), path);
        }
        None => println!("{}", json),
    }
}

fn run_contract(snapshot_path: &str, task: &str, global_path: Option<String>) {
    let graph = load_graph(snapshot_path);
    let global = load_global(global_path);
    let node = graph
        .nodes()
        .iter()
        .find(|n| n.id().as_str() == task || n.label == task)
        .unwrap_or_else(|| exit_with_error(&format!("No task named '{}'", task)));
    let contract = ScriptContract::for_node(node, &global)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    println!("{}", contract.declarations());
}

fn run_transpile(script_path: &str) {
    let source = fs::read_to_string(script_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read script '{}': {}", script_path, e))
    });
    let exec = TypeStripper
        .transpile(&source)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    print!("{}", exec);
}

/// Runs one request against the workflow server on a single-threaded runtime.
fn run_remote<F, Fut>(config: &Config, request: F)
where
    F: FnOnce(HttpClient) -> Fut,
    Fut: Future<Output = ()>,
{
    let token = std::env::var("FLOWDRAFT_TOKEN").ok();
    let client = HttpClient::new(config, Arc::new(StaticToken(token)))
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to create client: {}", e)));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to start runtime: {}", e)));
    runtime.block_on(request(client));
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
