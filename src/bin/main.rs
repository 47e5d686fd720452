//! Command line interface for training, classifying, and feature ranking

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use mcsvm::core::{LogDiagnostics, NeverInterrupt, Result, SvmError};
use mcsvm::kernel::{KernelFunction, KernelKind, KernelParameterRangeMap};
use mcsvm::persistence::SerializableModel;
use mcsvm::{read_shared_and_design_files, OneVsOneTrainer, Standardization, SvmRfe};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "mcsvm")]
#[command(about = "Multi-class SVM training, classification, and feature ranking")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable trace output
    #[arg(short, long, global = true)]
    trace: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a multi-class model from shared and design files
    Train(TrainArgs),
    /// Classify observations with a saved model
    Classify(ClassifyArgs),
    /// Rank features by recursive elimination
    Rfe(RfeArgs),
    /// Display model information
    Info(InfoArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Shared (abundance) file
    #[arg(long)]
    shared: PathBuf,

    /// Design (group-to-class) file
    #[arg(long)]
    design: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Kernels to search (repeatable); all four when omitted
    #[arg(short, long)]
    kernel: Vec<KernelKind>,

    /// Fold count for the winning candidate's accuracy estimate
    #[arg(long, default_value = "3")]
    evaluation_folds: usize,

    /// Fold count for candidate selection
    #[arg(long, default_value = "5")]
    train_folds: usize,

    /// Feature scaling: none, zero-one, or standard
    #[arg(long, default_value = "standard")]
    standardization: Standardization,
}

#[derive(Args)]
struct ClassifyArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Shared (abundance) file
    #[arg(long)]
    shared: PathBuf,

    /// Design (group-to-class) file
    #[arg(long)]
    design: PathBuf,

    /// Output predictions file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct RfeArgs {
    /// Shared (abundance) file
    #[arg(long)]
    shared: PathBuf,

    /// Design (group-to-class) file
    #[arg(long)]
    design: PathBuf,

    /// Output ranking file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fold count for the winning candidate's accuracy estimate
    #[arg(long, default_value = "3")]
    evaluation_folds: usize,

    /// Fold count for candidate selection
    #[arg(long, default_value = "5")]
    train_folds: usize,

    /// Feature scaling: none, zero-one, or standard
    #[arg(long, default_value = "standard")]
    standardization: Standardization,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.trace {
        "trace"
    } else if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Classify(args) => classify_command(args),
        Commands::Rfe(args) => rfe_command(args),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn selected_ranges(kernels: &[KernelKind]) -> KernelParameterRangeMap {
    let kinds: Vec<KernelKind> = if kernels.is_empty() {
        vec![
            KernelKind::Linear,
            KernelKind::Polynomial,
            KernelKind::Rbf,
            KernelKind::Sigmoid,
        ]
    } else {
        kernels.to_vec()
    };
    kinds
        .into_iter()
        .map(|kind| (kind, KernelFunction::default_parameter_ranges(kind)))
        .collect()
}

fn train_command(args: TrainArgs) -> Result<()> {
    info!("Loading dataset from {:?} and {:?}", args.shared, args.design);
    let dataset = read_shared_and_design_files(&args.shared, &args.design)?;
    info!(
        "Loaded {} observations with {} features",
        dataset.observation_count(),
        dataset.feature_count()
    );

    let mut trainer = OneVsOneTrainer::new();
    trainer.set_kernel_parameter_ranges(selected_ranges(&args.kernel));
    trainer.set_evaluation_fold_count(args.evaluation_folds);
    trainer.set_train_fold_count(args.train_folds);
    trainer.set_standardization(args.standardization);

    let model = trainer.train(&dataset, &NeverInterrupt, &LogDiagnostics)?;
    info!("Training completed successfully");

    let accuracy = model.accuracy(dataset.labeled_observations())?;
    info!("Training accuracy: {:.2}%", accuracy * 100.0);

    let serializable = SerializableModel::from_model(model);
    serializable.save_to_file(&args.output)?;
    info!("Model saved to: {:?}", args.output);
    serializable.print_summary();

    Ok(())
}

fn classify_command(args: ClassifyArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable = SerializableModel::load_from_file(&args.model)?;
    let model = serializable.model;

    let dataset = read_shared_and_design_files(&args.shared, &args.design)?;
    info!("Classifying {} observations", dataset.observation_count());

    let mut lines = Vec::with_capacity(dataset.observation_count() + 1);
    lines.push("observation\tlabel\tprediction".to_string());
    let mut correct = 0usize;
    for lo in dataset.labeled_observations() {
        let prediction = model.classify(&lo.observation)?;
        if prediction == &lo.label {
            correct += 1;
        }
        lines.push(format!("{}\t{}\t{}", lo.dataset_index, lo.label, prediction));
    }
    let accuracy = correct as f64 / dataset.observation_count() as f64;

    write_lines(&lines, args.output.as_ref())?;
    println!("Accuracy: {:.2}%", accuracy * 100.0);
    Ok(())
}

fn rfe_command(args: RfeArgs) -> Result<()> {
    let dataset = read_shared_and_design_files(&args.shared, &args.design)?;
    info!(
        "Ranking {} features over {} observations",
        dataset.feature_count(),
        dataset.observation_count()
    );

    let mut rfe = SvmRfe::new();
    rfe.set_evaluation_fold_count(args.evaluation_folds);
    rfe.set_train_fold_count(args.train_folds);
    rfe.set_standardization(args.standardization);
    let ranking = rfe.rank(&dataset, &NeverInterrupt, &LogDiagnostics)?;

    let mut lines = Vec::with_capacity(ranking.len() + 1);
    lines.push("feature\tindex\tround".to_string());
    // Most important features last survived the most rounds.
    for ranked in &ranking {
        lines.push(format!(
            "{}\t{}\t{}",
            ranked.feature.name, ranked.feature.index, ranked.round
        ));
    }
    write_lines(&lines, args.output.as_ref())
}

fn info_command(args: InfoArgs) -> Result<()> {
    let serializable = SerializableModel::load_from_file(&args.model)?;
    serializable.print_summary();
    for svm in serializable.model.svms() {
        println!(
            "  {}: {} kernel, {} support vectors, bias {:.6}",
            svm.label_pair(),
            svm.kernel().kind(),
            svm.support_vectors().len(),
            svm.bias()
        );
    }
    Ok(())
}

fn write_lines(lines: &[String], output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path).map_err(SvmError::Io)?;
            let mut writer = BufWriter::new(file);
            for line in lines {
                writeln!(writer, "{}", line).map_err(SvmError::Io)?;
            }
            info!("Output saved to: {:?}", path);
        }
        None => {
            for line in lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
