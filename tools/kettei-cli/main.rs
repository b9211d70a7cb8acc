use clap::Parser;
use kettei::formula::DisplayExpression;
use kettei::prelude::*;
use std::fs;
use std::io::{self, Read};
use std::time::Instant;

/// Evaluate a JSON workflow (logic blocks and calculations) against an input document
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow definition JSON file
    workflow_path: String,
    /// Path to the input document (JSON or CSV); `-` reads standard input
    input_path: Option<String>,

    /// Keep only outputs the output schema explicitly maps to `true`
    #[arg(long)]
    explicit_schema: bool,

    /// Leave the parsed input out of the debug trace
    #[arg(long)]
    no_input_echo: bool,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    /// Only validate the workflow definition, without running it
    #[arg(long)]
    validate_only: bool,

    /// Print the expression tree of every evaluated calculation
    #[arg(long)]
    show_formulas: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // --- 1. Workflow Loading ---
    let workflow_json = fs::read_to_string(&cli.workflow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read workflow file '{}': {}",
            &cli.workflow_path, e
        ))
    });
    let definition = workflow_json
        .as_str()
        .into_workflow()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse workflow: {}", e)));

    // --- 2. Validation ---
    if let Err(errors) = definition.validate() {
        for error in &errors {
            eprintln!("  - {}", error);
        }
        if cli.validate_only {
            exit_with_error(&format!("Workflow has {} problem(s)", errors.len()));
        }
        log::warn!("Running a workflow with {} validation problem(s)", errors.len());
    } else if cli.validate_only {
        println!(
            "Workflow is valid: {} logic block(s), {} calculation(s)",
            definition.logic_blocks.len(),
            definition.calculations.len()
        );
        print_input_references(&definition);
        return;
    }

    // --- 3. Input Loading ---
    let input = match cli.input_path.as_deref() {
        None => exit_with_error("An input path is required unless --validate-only is given."),
        Some("-") => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to read stdin: {}", e)));
            RawInput::Text(text)
        }
        Some(path) => RawInput::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to read input file '{}': {}", path, e))
        }),
    };

    // --- 4. Evaluation ---
    let policy = if cli.explicit_schema {
        SchemaPolicy::ExplicitOnly
    } else {
        SchemaPolicy::AbsentIncluded
    };
    let runner = WorkflowRunner::builder(definition)
        .schema_policy(policy)
        .include_input_in_debug(!cli.no_input_echo)
        .build();

    log::info!(
        "Evaluating {} logic block(s) and {} calculation(s) with {:?}",
        runner.definition().logic_blocks.len(),
        runner.definition().calculations.len(),
        runner.options().schema_policy
    );
    let eval_start = Instant::now();
    let output = runner
        .run(input)
        .unwrap_or_else(|e| exit_with_error(&format!("Evaluation failed: {}", e)));
    log::info!("Evaluation finished in {:?}", eval_start.elapsed());

    // --- 5. Results ---
    if cli.show_formulas {
        for calculation in output.debug.calculations() {
            eprintln!("\n{} = {}", calculation.name, calculation.substituted);
            match FormulaEngine::compile(&calculation.substituted) {
                Ok(expr) => eprint!("{}", DisplayExpression { expr: &expr }),
                Err(e) => eprintln!("  (does not parse: {})", e),
            }
        }
    }

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    };
    match rendered {
        Ok(json) => println!("{}", json),
        Err(e) => exit_with_error(&format!("Failed to serialize output: {}", e)),
    }
}

/// Lists, per calculation, the placeholders no earlier block or calculation
/// produces. Those are read from the input document, or count as `0`.
fn print_input_references(definition: &WorkflowDefinition) {
    let mut produced: Vec<&str> = definition
        .logic_blocks
        .iter()
        .map(|b| b.output_name.as_str())
        .collect();
    for calculation in &definition.calculations {
        let inputs: Vec<String> = FormulaEngine::placeholders(&calculation.formula)
            .into_iter()
            .filter(|path| !produced.contains(&path.as_str()))
            .collect();
        if !inputs.is_empty() {
            println!("  {} reads from input: {}", calculation.output_name, inputs.join(", "));
        }
        produced.push(calculation.output_name.as_str());
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
