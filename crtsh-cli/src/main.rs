mod display;

use std::time::Duration;

use clap::Parser;
use crtsh_core::colors::CatppuccinExt;
use crtsh_core::output::{get_formatter, OutputFormat};
use crtsh_core::CrtShClient;
use tracing_subscriber::EnvFilter;

use display::spinner::Spinner;

#[derive(Parser)]
#[command(name = "crtsh")]
#[command(about = "Certificate-transparency lookups via crt.sh")]
#[command(version)]
struct Cli {
    /// Domain to search for (matches the domain and all subdomains)
    #[arg(default_value = "example.com")]
    domain: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    timeout: u64,

    /// Output format (json or human)
    #[arg(short, long, default_value = "json")]
    format: String,

    /// crt.sh-compatible endpoint to query
    #[arg(long, default_value = crtsh_core::crtsh::DEFAULT_BASE_URL)]
    endpoint: String,

    /// Print only the de-duplicated subject names
    #[arg(long)]
    names_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let output_format: OutputFormat = cli
        .format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let formatter = get_formatter(output_format);

    let client = CrtShClient::new()
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_base_url(&cli.endpoint);

    let result = {
        let _spinner = (output_format == OutputFormat::Human)
            .then(|| Spinner::new(&format!("Searching crt.sh for {}...", cli.domain)));
        client.lookup(&cli.domain).await
    };

    if cli.names_only && !result.failed {
        println!("{}", formatter.format_names(&result.unique_names()));
    } else if output_format == OutputFormat::Json {
        // Serialization failure aborts with an error rather than printing a stub
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", formatter.format_lookup(&result));
    }

    if result.failed {
        if cli.names_only || output_format == OutputFormat::Json {
            eprintln!(
                "{} {}",
                "Error:".ctp_red(),
                result.error_message.as_deref().unwrap_or("lookup failed")
            );
        }
        std::process::exit(1);
    }

    Ok(())
}
