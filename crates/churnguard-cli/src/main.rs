use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;

use churnguard_pipeline::config::PipelineConfig;
use churnguard_pipeline::io::read_customer_csv;
use churnguard_pipeline::pipeline::{self, PipelineOutcome};

mod report;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(
            env_logger::Env::default()
                .filter_or("CHURNGUARD_LOG", "error,churnguard_pipeline=info"),
        )
        .init();

    let matches = Command::new("churnguard")
        .version(clap::crate_version!())
        .about("Customer churn prediction: clean, engineer, tune, evaluate")
        .arg(
            Arg::new("data")
                .help("Path to the customer CSV file")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a JSON pipeline configuration; defaults are used when omitted")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("model_out")
                .short('m')
                .long("model-out")
                .help("File the fitted model is serialized to")
                .default_value("churn_model.json")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("report_out")
                .short('r')
                .long("report-out")
                .help("File the HTML report is written to")
                .default_value("churn_report.html")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("no_report")
                .long("no-report")
                .help("Disable HTML report generation")
                .action(ArgAction::SetTrue),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match run(&matches) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("churnguard failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let data_path: &PathBuf = matches.get_one("data").unwrap();
    let model_out: &PathBuf = matches.get_one("model_out").unwrap();
    let report_out: &PathBuf = matches.get_one("report_out").unwrap();

    let config = load_config(matches.get_one::<PathBuf>("config"))?;

    let dataset = read_customer_csv(data_path)
        .with_context(|| format!("failed to load {}", data_path.display()))?;

    let outcome = pipeline::run(&dataset, &config).context("pipeline run failed")?;

    print_metrics(&outcome);

    outcome
        .model
        .save(model_out)
        .context("failed to persist the tuned model")?;
    println!("Model saved to: {}", model_out.display());

    if !matches.get_flag("no_report") {
        report::write_report(&outcome, &config, report_out)?;
        println!("Report written to: {}", report_out.display());
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config: PipelineConfig = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            Ok(config)
        }
        None => {
            log::info!("no config file provided; using defaults");
            Ok(PipelineConfig::default())
        }
    }
}

fn print_metrics(outcome: &PipelineOutcome) {
    println!("----- Initial model -----");
    println!("Accuracy: {:.2}", outcome.initial_eval.accuracy);
    println!("Precision: {:.2}", outcome.initial_eval.precision);
    println!("Recall: {:.2}", outcome.initial_eval.recall);
    println!("F1-score: {:.2}", outcome.initial_eval.f1);
    println!();
    println!("Best Parameters: {:?}", outcome.best_params);
    println!();
    println!("----- Tuned model -----");
    println!("Accuracy: {:.2}", outcome.tuned_eval.accuracy);
    println!("Precision: {:.2}", outcome.tuned_eval.precision);
    println!("Recall: {:.2}", outcome.tuned_eval.recall);
    println!("F1-score: {:.2}", outcome.tuned_eval.f1);
    println!();
    println!("{}", outcome.tuned_eval.report.to_table_string());
    println!("{}", outcome.tuned_eval.confusion);
}
