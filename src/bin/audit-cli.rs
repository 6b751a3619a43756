use clap::{Parser, Subcommand};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "audit-cli")]
#[command(about = "Command line client for the site audit service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:4000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the service is up
    Health,
    /// Audit a site and print the result
    Audit {
        /// Site to audit; `https://` is assumed when no scheme is given
        url: String,
    },
    /// Download the PDF report for the last cached audit of a site
    Report {
        url: String,

        #[arg(short, long, default_value = "report.pdf")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.server)).send().await?;
            print_response(res).await?;
        }
        Commands::Audit { url } => {
            let res = client
                .get(format!("{}/audit", cli.server))
                .query(&[("url", url.as_str())])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Report { url, output } => {
            let res = client
                .get(format!("{}/report", cli.server))
                .query(&[("url", url.as_str())])
                .send()
                .await?;

            let is_pdf = res
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("application/pdf"));
            if !res.status().is_success() || !is_pdf {
                return print_response(res).await;
            }

            let bytes = res.bytes().await?;
            tokio::fs::write(&output, &bytes).await?;
            println!("Wrote {} bytes to {}", bytes.len(), output.display());
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: audit service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
