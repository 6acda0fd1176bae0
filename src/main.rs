//! Loan default prediction CLI
//!
//! Loads the persisted encoder/model artifacts and runs the prediction
//! pipeline against JSON input files.

use clap::{Parser, Subcommand};
use mudra::{Config, Result};

#[derive(Parser)]
#[command(name = "mudra")]
#[command(about = "Loan default risk prediction", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default config (and optionally a demo artifact set)
    Init {
        /// Also write a small synthetic artifact set with untrained weights
        #[arg(long)]
        demo: bool,
    },
    /// Predict default risk for a JSON input file
    Predict {
        /// Path to a JSON object mapping feature name to value
        input: String,
        /// Output format: table or json
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// List the known labels of a categorical feature
    Labels {
        /// Feature name
        feature: String,
    },
    /// List the feature order with each feature's kind
    Features,
    /// Load all artifacts and report their consistency
    Validate,
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Run command
    let result = match cli.command {
        Commands::Init { demo } => commands::init(&cli.config, &config, demo),
        Commands::Predict { input, format } => commands::predict(&config, &input, format),
        Commands::Labels { feature } => commands::labels(&config, &feature),
        Commands::Features => commands::features(&config),
        Commands::Validate => commands::validate(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use burn::backend::NdArray;
    use mudra::artifacts::{self, Artifacts};
    use mudra::encoders::{EncoderRegistry, FeatureOrder, LabelEncoder};
    use mudra::model::{Classifier, ClassifierConfig};
    use mudra::predict::{format_prediction, Predictor};
    use mudra::{MudraError, RawInput};

    type Backend = NdArray<f32>;

    pub fn init(config_path: &str, config: &Config, demo: bool) -> Result<()> {
        config.save(config_path)?;
        println!("Created config at {}", config_path);

        if demo {
            write_demo_artifacts(config)?;
            println!("Wrote demo artifacts (untrained weights):");
            println!("  {}", config.artifacts.encoders_path);
            println!("  {}", config.artifacts.feature_order_path);
            println!("  {}.mpk", config.artifacts.model_path);
        } else {
            println!("\nNext steps:");
            println!("  1. Edit {} to point at your artifact files", config_path);
            println!("  2. Run 'mudra validate' to check them");
            println!("  3. Run 'mudra predict input.json'");
        }
        Ok(())
    }

    /// Build a small artifact set so the CLI is runnable end-to-end without
    /// the real training pipeline. Weights are freshly initialized, not
    /// trained; predictions from them are meaningless.
    fn write_demo_artifacts(config: &Config) -> Result<()> {
        let mut registry = EncoderRegistry::new();
        registry.insert(
            "business",
            LabelEncoder::new(["Manufacturing", "Retail", "Services"]),
        );
        registry.insert("demography", LabelEncoder::new(["Rural", "Urban"]));
        registry.insert("low_documentation_loan", LabelEncoder::new(["No", "Yes"]));
        registry.insert("revolving_credit_line", LabelEncoder::new(["No", "Yes"]));

        let order = FeatureOrder::new([
            "business",
            "demography",
            "low_documentation_loan",
            "revolving_credit_line",
            "jobs_created",
            "jobs_retained",
            "loan_approved_gross",
            "loan_term",
            "count_employees",
        ]);

        artifacts::save_json(&config.artifacts.encoders_path, &registry)?;
        artifacts::save_json(&config.artifacts.feature_order_path, &order)?;

        let device = Default::default();
        let model_config = ClassifierConfig::from_model_config(&config.model, order.len());
        let model = Classifier::<Backend>::new(&device, model_config);
        model.save(&config.artifacts.model_path)?;
        Ok(())
    }

    pub fn predict(config: &Config, input_path: &str, format: OutputFormat) -> Result<()> {
        let content = std::fs::read_to_string(input_path)?;
        let input: RawInput = serde_json::from_str(&content)
            .map_err(|e| MudraError::Config(format!("Failed to parse {}: {}", input_path, e)))?;

        let predictor = Predictor::<Backend>::load(config, Default::default())?;
        let prediction = predictor.predict_loan_default(&input)?;

        match format {
            OutputFormat::Table => println!("{}", format_prediction(&prediction)),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&prediction)
                    .map_err(|e| MudraError::Io(std::io::Error::other(e.to_string())))?;
                println!("{}", json);
            }
        }
        Ok(())
    }

    pub fn labels(config: &Config, feature: &str) -> Result<()> {
        let artifacts = Artifacts::load(config)?;
        let labels = artifacts
            .registry
            .labels(feature)
            .ok_or_else(|| MudraError::UnknownFeature(feature.to_string()))?;

        for label in labels {
            println!("{}", label);
        }
        Ok(())
    }

    pub fn features(config: &Config) -> Result<()> {
        let artifacts = Artifacts::load(config)?;

        println!("Feature order ({} columns):", artifacts.order.len());
        for (i, name) in artifacts.order.iter().enumerate() {
            let kind = match artifacts.registry.labels(name) {
                Some(labels) => format!("categorical ({} labels)", labels.len()),
                None => "numeric".to_string(),
            };
            println!("  {:>3}  {:<28} {}", i, name, kind);
        }
        Ok(())
    }

    pub fn validate(config: &Config) -> Result<()> {
        let artifacts = Artifacts::load(config)?;
        let model_config = ClassifierConfig::from_model_config(&config.model, artifacts.order.len());
        Classifier::<Backend>::load(
            &Default::default(),
            &config.artifacts.model_path,
            model_config,
        )?;

        println!("Artifacts OK");
        println!("  features:    {}", artifacts.order.len());
        println!("  categorical: {}", artifacts.registry.len());
        println!("  model input: {} columns", artifacts.order.len());
        Ok(())
    }
}
