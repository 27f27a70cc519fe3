//! Interactive withdrawal parameter prompts.

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::domain::{AmountSpec, CoinInfo, IntervalSpec};
use crate::error::Result;
use crate::port::outbound::connector::ExchangeId;

/// Pick an exchange from the menu; `None` means exit.
pub fn select_exchange(theme: &ColorfulTheme) -> Result<Option<ExchangeId>> {
    let mut items: Vec<String> = ExchangeId::ALL.iter().map(|id| id.name().to_string()).collect();
    items.push("Exit".to_string());

    let choice = Select::with_theme(theme)
        .with_prompt("Select an exchange")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(ExchangeId::ALL.get(choice).copied())
}

/// Ask for the coin ticker (case-insensitive, e.g. `eth`).
pub fn coin(theme: &ColorfulTheme) -> Result<String> {
    let input: String = Input::with_theme(theme)
        .with_prompt("Coin (e.g. ETH)")
        .validate_with(|value: &String| -> std::result::Result<(), &str> {
            if value.trim().is_empty() {
                Err("coin cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(input.trim().to_uppercase())
}

/// Pick one of the coin's withdraw-enabled networks.
pub fn network(theme: &ColorfulTheme, info: &CoinInfo) -> Result<String> {
    let items: Vec<String> = info
        .networks
        .iter()
        .map(|n| match n.withdraw_min {
            Some(min) => format!("{} (fee {}, min {})", n.id, n.withdraw_fee, min),
            None => format!("{} (fee {})", n.id, n.withdraw_fee),
        })
        .collect();

    let choice = Select::with_theme(theme)
        .with_prompt(format!("Network for {}", info.coin))
        .items(&items)
        .default(0)
        .interact()?;

    Ok(info.networks[choice].id.clone())
}

/// Ask for the per-target amount: a fixed value or a `MIN-MAX` range.
pub fn amounts(theme: &ColorfulTheme) -> Result<AmountSpec> {
    let input: String = Input::with_theme(theme)
        .with_prompt("Amount per target (e.g. 1 or 1-10)")
        .validate_with(|value: &String| value.parse::<AmountSpec>().map(|_| ()).map_err(|e| e.to_string()))
        .interact_text()?;
    Ok(input.parse().expect("validated above"))
}

/// Ask for the inter-target delay in seconds: fixed or a `MIN-MAX` range.
pub fn intervals(theme: &ColorfulTheme) -> Result<IntervalSpec> {
    let input: String = Input::with_theme(theme)
        .with_prompt("Delay between targets in seconds (e.g. 100 or 30-90)")
        .validate_with(|value: &String| value.parse::<IntervalSpec>().map(|_| ()).map_err(|e| e.to_string()))
        .interact_text()?;
    Ok(input.parse().expect("validated above"))
}

/// Final gate before funds move.
pub fn confirm_run(theme: &ColorfulTheme, exchange: &str, coin: &str, count: usize) -> Result<bool> {
    Ok(Confirm::with_theme(theme)
        .with_prompt(format!(
            "Start {count} {coin} withdrawals on {exchange}? Real funds will move"
        ))
        .default(false)
        .interact()?)
}
