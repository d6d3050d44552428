use atm_withdrawal::application::atm::AtmMachine;
use atm_withdrawal::config::AtmConfig;
use atm_withdrawal::infrastructure::fixture::BankFixture;
use atm_withdrawal::interfaces::csv::request_reader::RequestReader;
use atm_withdrawal::interfaces::csv::result_writer::{ResultWriter, WithdrawalRecord};
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input withdrawal requests CSV file
    input: PathBuf,

    /// JSON description of the cards, accounts and depot stock to run against
    #[arg(long)]
    fixture: PathBuf,

    /// JSON machine configuration (denominations, refund policy). Defaults apply if omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => AtmConfig::from_json_file(path).into_diagnostic()?,
        None => AtmConfig::default(),
    };
    let simulation = BankFixture::from_json_file(cli.fixture)
        .into_diagnostic()?
        .into_simulation()
        .await
        .into_diagnostic()?;

    let atm = AtmMachine::with_config(
        Box::new(simulation.card_authorizer),
        Box::new(simulation.bank),
        Box::new(simulation.money_depot),
        config,
    );
    info!(denominations = ?atm.config().denominations.values(), "ATM ready");

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = RequestReader::new(file);
    let stdout = io::stdout();
    let mut writer = ResultWriter::new(stdout.lock());

    for request in reader.requests() {
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable withdrawal request");
                continue;
            }
        };

        let outcome = atm.withdraw(&request.money(), &request.card()).await;
        if let Err(e) = &outcome {
            info!(card = %request.card, error = %e, "Withdrawal rejected");
        }
        writer
            .write(&WithdrawalRecord::from_outcome(&request, &outcome))
            .into_diagnostic()?;
    }

    writer.flush().into_diagnostic()?;
    Ok(())
}
