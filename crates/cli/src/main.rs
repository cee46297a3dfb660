use anyhow::Context;
use clap::Parser;
use dnscore_domain::{CliOverrides, DnsName, DnsRequest, DnsTransportType, RecordType};
use dnscore_infrastructure::dns::{ClientOptions, DnsClient};
use tracing::{debug, info};

mod bootstrap;

#[derive(Parser)]
#[command(name = "dnscore")]
#[command(version)]
#[command(about = "Send a single DNS query over UDP or TCP and print the response")]
struct Cli {
    /// Name to look up
    #[arg(short = 'q', long)]
    query: String,

    /// Record type (A, AAAA, MX, TXT, TYPE65 ...)
    #[arg(short = 't', long = "type", default_value = "A")]
    record_type: RecordType,

    /// Server IP address
    #[arg(short = 's', long)]
    server: Option<String>,

    /// Server port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Use TCP instead of UDP
    #[arg(long)]
    tcp: bool,

    /// Per-query timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        server: cli.server.clone(),
        port: cli.port,
        transport: cli.tcp.then_some(DnsTransportType::Tcp),
        request_timeout_ms: cli.timeout_ms,
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config);

    debug!(?config, "Configuration loaded");

    let name = DnsName::parse(&cli.query)
        .with_context(|| format!("invalid query name '{}'", cli.query))?;
    let options = ClientOptions::from_config(&config.client)?;
    let client = DnsClient::new(options)?;

    let request = DnsRequest::new(name, cli.record_type);
    println!("{}\n", request);

    let result = client.query(&request).await;
    client.shutdown().await;

    let response = result.with_context(|| {
        format!(
            "query to {}:{} failed",
            config.client.server, config.client.port
        )
    })?;
    info!(
        id = response.id,
        status = %response.status,
        answers = response.answers.len(),
        "Query complete"
    );
    println!("{}", response);

    Ok(())
}
