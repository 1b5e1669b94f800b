use anyhow::Result;
use clap::Parser;
use onnx_classify::models::Resources;
use onnx_classify::{ClassificationPipeline, ClassifierContext, Config};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "onnx-classify")]
#[command(about = "Classify a single image with a pre-trained ONNX model")]
struct Args {
    /// Model directory path (model.onnx, labels.txt, sample.jpg)
    #[arg(long, default_value = "models")]
    models_dir: String,

    /// Image to classify, defaults to <models-dir>/sample.jpg
    #[arg(long)]
    image: Option<String>,

    /// Square input size expected by the model
    #[arg(long, default_value_t = 224)]
    size: u32,

    /// Model input tensor name
    #[arg(long, default_value = "images")]
    input_name: String,

    /// Model output tensor name
    #[arg(long, default_value = "output0")]
    output_name: String,

    /// Inference timeout in milliseconds, 0 disables it
    #[arg(long, default_value_t = 30_000)]
    timeout_ms: u64,

    /// Number of intra-op threads
    #[arg(long)]
    threads: Option<usize>,

    /// Print the k best labels instead of only the winner
    #[arg(long, default_value_t = 1)]
    top_k: usize,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // 日志写到stderr，stdout只输出结果
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&args.log_level))
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match run(&args).await {
        Ok(output) => {
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("error [{}/{}]: {}", e.stage(), e.error_code(), e);
            Ok(ExitCode::from(e.exit_code() as u8))
        }
    }
}

async fn run(args: &Args) -> onnx_classify::Result<String> {
    let mut config = Config::new(
        args.models_dir.clone(),
        args.image.clone(),
        args.size,
        args.threads,
    )?;
    config.inference_config.input_name = args.input_name.clone();
    config.inference_config.output_name = args.output_name.clone();
    config.inference_config.timeout_ms = args.timeout_ms;
    config.inference_config.top_k = args.top_k;
    config.validate()?;

    tracing::info!("Models directory: {}", config.models_dir.display());
    tracing::info!("Image: {}", config.image_path().display());

    let context = ClassifierContext::load(&config)?;
    let image = Resources::read_image(&config)?;
    let result = ClassificationPipeline::classify_bytes(&context, &image).await?;

    if args.json {
        return Ok(serde_json::to_string_pretty(&result)?);
    }

    if args.top_k <= 1 {
        return Ok(result.label);
    }

    let lines: Vec<String> = result
        .top
        .iter()
        .enumerate()
        .map(|(rank, p)| format!("{}. {} ({:.4})", rank + 1, p.label, p.score))
        .collect();
    Ok(lines.join("\n"))
}
