use clap::Parser;
use jobstore_cli::{diagnostic, success_message, Source, UploadClient};
use jobstore_core::constants::DEFAULT_BASE_URI;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jobstore-upload")]
#[command(about = "Upload a file, or standard input, to a jobstore server")]
struct Cli {
    /// Server base URL
    #[arg(short = 'b', long, env = "JOBSTORE_BASE_URI", default_value = DEFAULT_BASE_URI)]
    base_uri: String,
    /// Job ID to upload into; if not set, the server assigns one for future use
    #[arg(short = 'j', long = "job-id", env = "JOBSTORE_JOB_ID")]
    job_id: Option<String>,
    /// File to upload (reads standard input when omitted)
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", diagnostic(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jobstore_cli=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let source = Source::from_arg(cli.file);
    let content = source.read()?;
    let file_name = source.file_name();

    let client = UploadClient::new(&cli.base_uri)?;
    let receipt = client
        .upload(content, &file_name, cli.job_id.as_deref())
        .await?;

    print!("{}", success_message(&receipt));

    Ok(())
}
