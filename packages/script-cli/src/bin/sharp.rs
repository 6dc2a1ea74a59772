/**
 * Sharp Script CLI - sharp
 *
 * Renders template files or evaluates an expression against JSON arguments
 */
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use indexmap::IndexMap;
use sharp_script_cli::inputs::{expand_inputs, load_args, load_config};
use sharp_script_cli::logging::init_logging;
use sharp_script_cli::render::{evaluate_to_json, render_files};
use sharp_script_cli::script::{ScriptContext, Value};

fn args_arg() -> Arg {
    Arg::new("args")
        .short('a')
        .long("args")
        .value_name("FILE")
        .help("JSON file with the template arguments")
}

fn main() {
    let matches = Command::new("sharp")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Sharp Script template renderer")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log debug events to stderr")
                .global(true),
        )
        .subcommand(
            Command::new("render")
                .about("Render template files")
                .arg(
                    Arg::new("files")
                        .value_name("FILES")
                        .num_args(1..)
                        .required(true)
                        .help("Template files or glob patterns"),
                )
                .arg(args_arg())
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("FILE")
                        .help("JSON script config"),
                ),
        )
        .subcommand(
            Command::new("eval")
                .about("Evaluate one expression and print the result as JSON")
                .arg(
                    Arg::new("expression")
                        .value_name("EXPR")
                        .required(true)
                        .help("Expression to evaluate"),
                )
                .arg(args_arg()),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));

    let result = match matches.subcommand() {
        Some(("render", sub)) => run_render(sub),
        Some(("eval", sub)) => run_eval(sub),
        _ => Ok(true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn template_args(matches: &ArgMatches) -> Result<IndexMap<String, Value>> {
    match matches.get_one::<String>("args") {
        Some(path) => load_args(&PathBuf::from(path)),
        None => Ok(IndexMap::new()),
    }
}

/// Returns whether every template rendered
fn run_render(matches: &ArgMatches) -> Result<bool> {
    let patterns: Vec<String> = matches
        .get_many::<String>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let files = expand_inputs(&patterns)?;
    let args = template_args(matches)?;

    let mut context = ScriptContext::new();
    if let Some(path) = matches.get_one::<String>("config") {
        context = context.with_config(load_config(&PathBuf::from(path))?);
    }
    let context = Arc::new(context);

    let mut ok = true;
    for outcome in render_files(&context, &files, &args) {
        match outcome.result {
            Ok(output) => print!("{}", output),
            Err(e) => {
                ok = false;
                eprintln!("Error: {}: {:#}", outcome.path.display(), e);
            }
        }
    }
    Ok(ok)
}

fn run_eval(matches: &ArgMatches) -> Result<bool> {
    let expression = matches
        .get_one::<String>("expression")
        .map(String::as_str)
        .unwrap_or_default();
    let args = template_args(matches)?;
    println!("{}", evaluate_to_json(&ScriptContext::new(), expression, args)?);
    Ok(true)
}
