use clap::Parser;
use octofhir_modelgen::core::{DialectSetting, ModelGenConfig, init_logging};
use octofhir_modelgen::{
    DefinitionIndex, JsonModelEmitter, ModelCompiler, ModelGenError, TypeCatalog,
};
use std::path::PathBuf;

/// Compile FHIR StructureDefinitions into model trees with their full
/// dependency closure.
#[derive(Parser, Debug)]
#[command(name = "modelgen")]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// StructureDefinition bundles (JSON)
    inputs: Vec<PathBuf>,

    /// Root definitions to compile, comma separated
    #[arg(short, long, value_delimiter = ',')]
    items: Vec<String>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Clear the output directory first
    #[arg(long)]
    clear: bool,

    /// Schema dialect: auto, legacy or canonical
    #[arg(long)]
    dialect: Option<DialectSetting>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Configuration file settings with command-line overrides applied.
    fn resolve_config(&self) -> octofhir_modelgen::Result<ModelGenConfig> {
        let mut config = match &self.config {
            Some(path) => ModelGenConfig::from_yaml_file(path)?,
            None => ModelGenConfig::default(),
        };

        if !self.inputs.is_empty() {
            config.inputs = self.inputs.clone();
        }
        if !self.items.is_empty() {
            config.items = self.items.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if self.clear {
            config.clear_output_dir = true;
        }
        if let Some(dialect) = self.dialect {
            config.dialect = dialect;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }

        if config.inputs.is_empty() {
            return Err(ModelGenError::validation("no input bundles given"));
        }
        if config.items.is_empty() {
            return Err(ModelGenError::validation("no root definitions given (use --items)"));
        }
        config.validate()?;
        Ok(config)
    }
}

fn generate(
    config: &ModelGenConfig,
    index: &DefinitionIndex,
    catalog: &TypeCatalog,
) -> octofhir_modelgen::Result<Vec<String>> {
    let compiler = ModelCompiler::with_config(index, catalog, config.compiler.clone());
    let mut emitter = if config.clear_output_dir {
        JsonModelEmitter::cleared(&config.output_dir)?
    } else {
        JsonModelEmitter::new(&config.output_dir)?
    };
    compiler.generate(config.items.as_slice(), &mut emitter)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(&config.logging)?;

    let mut index = DefinitionIndex::new();
    for input in &config.inputs {
        let json = tokio::fs::read_to_string(input).await?;
        let count = index.add_json(&json)?;
        tracing::info!("Loaded {} definitions from {}", count, input.display());
    }
    index.set_dialect(config.dialect.pinned());
    tracing::info!("Using {:?} schema dialect", index.dialect());

    let catalog = config.catalog.build();
    let output_dir = config.output_dir.clone();
    let processed =
        tokio::task::spawn_blocking(move || generate(&config, &index, &catalog)).await??;

    println!(
        "Generated {} definitions into {}",
        processed.len(),
        output_dir.display()
    );
    for name in &processed {
        println!("  {name}");
    }

    Ok(())
}
