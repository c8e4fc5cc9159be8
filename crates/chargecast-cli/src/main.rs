use anyhow::Result;
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;

use chargecast_cli::app::App;
use chargecast_core::config::{load_config, AppConfig};
use chargecast_core::models::Variant;
use chargecast_core::record::RawInput;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("CHARGECAST_LOG", "error,chargecast=info"))
        .init();

    let matches = Command::new("chargecast")
        .version(clap::crate_version!())
        .about("Insurance charge estimation from pre-trained regression models")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("predict")
                .about("Predict charges for one patient record")
                .arg(config_arg())
                .arg(variant_arg())
                .arg(record_arg("age", "Patient age in years"))
                .arg(record_arg("sex", "Patient sex (male|female)"))
                .arg(record_arg("bmi", "Body mass index"))
                .arg(record_arg("children", "Number of dependents"))
                .arg(record_arg("smoker", "Smoker (yes|no)"))
                .arg(record_arg("region", "US region (northeast|northwest|southeast|southwest)")),
        )
        .subcommand(
            Command::new("metrics")
                .about("Evaluate every loaded variant against the reference dataset")
                .arg(config_arg())
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .help("Reference dataset CSV. Overrides the path from the configuration file.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("explain")
                .about("Permutation importance, or per-record attribution when record flags are given")
                .arg(config_arg())
                .arg(variant_arg())
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .help("Reference dataset CSV. Overrides the path from the configuration file.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(record_arg("age", "Patient age in years"))
                .arg(record_arg("sex", "Patient sex (male|female)"))
                .arg(record_arg("bmi", "Body mass index"))
                .arg(record_arg("children", "Number of dependents"))
                .arg(record_arg("smoker", "Smoker (yes|no)"))
                .arg(record_arg("region", "US region (northeast|northwest|southeast|southwest)")),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("predict", sub_m)) => handle_predict(sub_m),
        Some(("metrics", sub_m)) => handle_metrics(sub_m),
        Some(("explain", sub_m)) => handle_explain(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help("Path to the JSON application configuration file")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn variant_arg() -> Arg {
    Arg::new("variant")
        .short('v')
        .long("variant")
        .help("Model variant to use")
        .value_parser(["linear", "random-forest", "boosted-tree", "dummy"])
        .default_value("boosted-tree")
}

fn record_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .value_hint(ValueHint::Other)
}

fn resolve_config(matches: &ArgMatches) -> Result<AppConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            log::info!("[chargecast] Using config: {:?}", path);
            load_config(path)
        }
        None => {
            let config = AppConfig::default();
            let default_json = serde_json::to_string_pretty(&config).unwrap_or_default();
            eprintln!("[chargecast] No config provided; using defaults:\n{}", default_json);
            Ok(config)
        }
    }
}

fn record_from_matches(matches: &ArgMatches) -> RawInput {
    let take = |name: &str| matches.get_one::<String>(name).cloned();
    RawInput {
        age: take("age"),
        sex: take("sex"),
        bmi: take("bmi"),
        children: take("children"),
        smoker: take("smoker"),
        region: take("region"),
    }
}

fn parse_variant(matches: &ArgMatches) -> Result<Variant> {
    let raw: &String = matches.get_one("variant").expect("variant has a default");
    Variant::from_str(raw).map_err(anyhow::Error::msg)
}

fn bootstrap(matches: &ArgMatches) -> Result<(App, AppConfig)> {
    let mut config = resolve_config(matches)?;
    if matches.try_get_one::<PathBuf>("data").ok().flatten().is_some() {
        config.reference_data = matches.get_one::<PathBuf>("data").cloned();
    }

    match App::bootstrap(&config) {
        Ok(app) => Ok((app, config)),
        Err(e) => {
            log::error!("Startup failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let (app, _) = bootstrap(matches)?;
    let variant = parse_variant(matches)?;
    let input = record_from_matches(matches);
    app.run_predict(&input, variant)
}

fn handle_metrics(matches: &ArgMatches) -> Result<()> {
    let (app, _) = bootstrap(matches)?;
    app.run_metrics()
}

fn handle_explain(matches: &ArgMatches) -> Result<()> {
    let (app, _) = bootstrap(matches)?;
    let variant = parse_variant(matches)?;
    let input = record_from_matches(matches);

    let has_record_flags = [
        &input.age,
        &input.sex,
        &input.bmi,
        &input.children,
        &input.smoker,
        &input.region,
    ]
    .iter()
    .any(|field| field.is_some());

    let instance = has_record_flags.then_some(&input);
    app.run_explain(variant, instance)
}
