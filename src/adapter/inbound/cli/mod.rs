//! Interactive CLI: exchange menu, parameter prompts, run reporting.

pub mod prompt;
pub mod report;
pub mod targets;

use dialoguer::theme::ColorfulTheme;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::adapter::outbound::build_connector;
use crate::app::WithdrawSession;
use crate::config::Config;
use crate::domain::WithdrawalTarget;
use crate::error::Result;
use crate::port::outbound::connector::ExchangeConnector;

const BANNER: &str = r"
  ╔══════════════════════════════════════╗
  ║   dripfeed — batch withdrawal tool   ║
  ╚══════════════════════════════════════╝

  Before you start:
  1. API keys need withdrawal permission enabled.
  2. Test with a small amount first.
  3. Some exchanges require addresses to be allowlisted on the web UI.
  4. Make sure every address supports the network you pick.
";

/// Run the interactive menu loop until the operator exits.
///
/// Missing credentials for a selected exchange are fatal and propagate out;
/// configuration-step failures (unreachable exchange, unknown coin,
/// unsupported network) return to the menu.
pub async fn run(
    config: &Config,
    targets: &[WithdrawalTarget],
    cancel: &CancellationToken,
) -> Result<()> {
    println!("{BANNER}");
    let theme = ColorfulTheme::default();

    loop {
        if cancel.is_cancelled() {
            return Ok(());
        }

        let Some(exchange) = prompt::select_exchange(&theme)? else {
            println!("Goodbye.");
            return Ok(());
        };

        let credentials = config.credentials_for(exchange)?;
        let connector = match build_connector(exchange, &credentials).await {
            Ok(connector) => connector,
            Err(err) => {
                error!(exchange = %exchange, error = %err, "Failed to reach exchange");
                continue;
            }
        };

        if let Err(err) = configure_and_run(&theme, connector.as_ref(), targets, cancel).await {
            error!(exchange = %exchange, error = %err, "Withdrawal flow aborted");
        }
    }
}

/// One configuration + run cycle against a connected exchange.
async fn configure_and_run(
    theme: &ColorfulTheme,
    connector: &dyn ExchangeConnector,
    targets: &[WithdrawalTarget],
    cancel: &CancellationToken,
) -> Result<()> {
    let session = WithdrawSession::begin(connector).await?;

    let coin = session.resolve_coin(&prompt::coin(theme)?)?.clone();
    let network = prompt::network(theme, &coin)?;
    let amounts = prompt::amounts(theme)?;
    let intervals = prompt::intervals(theme)?;
    let plan = session.plan(&coin.coin, &network, amounts, intervals)?;

    if !prompt::confirm_run(theme, connector.name(), &plan.coin, targets.len())? {
        info!("Run not confirmed, returning to menu");
        return Ok(());
    }

    let summary = session.run(plan, targets, cancel).await?;
    println!("{}", report::render(&summary));
    Ok(())
}
