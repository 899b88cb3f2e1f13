use crate::cli::Cli;
use crate::commands::{spinner, Context, Result};
use crate::output::{emit, OutputData};
use exabrowse_core::donation::amount_to_cents;
use exabrowse_core::Donations;

pub async fn run(cli: &Cli, amount: f64) -> Result<()> {
    // Reject bad amounts before touching credentials.
    let cents = amount_to_cents(amount)?;
    tracing::debug!(cents, "Creating donation intent");

    let donations = Donations::new(Context::load()?.payment_provider()?);
    let progress = spinner(format!("Creating ${:.2} payment intent...", amount));
    let result = donations.create_intent(amount).await;
    progress.finish_and_clear();

    emit(cli, &OutputData::Donation(result?))
}
