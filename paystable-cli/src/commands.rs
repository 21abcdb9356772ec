//! Subcommand implementations.

use crate::config::runtime::AppConfig;
use crate::render::{KEY_HELP, render_payment_status, render_product, render_snapshot};
use crate::shutdown::shutdown_signal;
use anyhow::anyhow;
use paystable_core::events::{SessionCommand, session_command_channel};
use paystable_core::flow::{PaymentState, PaymentStateKind};
use paystable_core::processors::PaymentSessionController;
use paystable_sdk::client::BackendClient;
use paystable_sdk::fiat::{NumberLocale, asset_to_human_friendly, fiat_to_human_friendly};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

/// `paystable format`
pub fn format_amount(amount: i64, asset: bool, locale: &NumberLocale) -> String {
    if asset {
        asset_to_human_friendly(amount, locale)
    } else {
        fiat_to_human_friendly(amount, locale)
    }
}

/// `paystable products`
pub async fn products(client: &BackendClient, locale: &NumberLocale) -> anyhow::Result<()> {
    let products = client.list_products().await?;
    tracing::debug!(count = products.len(), "Fetched product catalog");
    for product in &products {
        println!("{}", render_product(product, locale));
    }
    Ok(())
}

/// `paystable status`
pub async fn status(client: &BackendClient, order_id: &str) -> anyhow::Result<()> {
    let status = client.get_payment_status(order_id).await?;
    print!("{}", render_payment_status(&status));
    Ok(())
}

/// `paystable order`
pub async fn order(
    client: &BackendClient,
    order_id: &str,
    locale: &NumberLocale,
) -> anyhow::Result<()> {
    let order = client.get_order_details(order_id).await?;
    println!("order: {}", order.order_id);
    println!("created: {}", order.created_at);
    if let Some(reference) = &order.vasp_payment_reference {
        println!("payment reference: {reference}");
    }
    for item in &order.products {
        println!("  {} x {}", item.quantity, render_product(&item.product, locale));
    }
    println!(
        "total: {} {}",
        order.total_price.to_human_friendly(locale),
        order.currency
    );
    print!("{}", render_payment_status(&order.payment_status));
    Ok(())
}

/// What a line typed during checkout asks for.
#[derive(Debug, PartialEq)]
enum KeyCommand {
    Session(SessionCommand),
    Quit,
}

fn parse_key(line: &str) -> Option<KeyCommand> {
    let command = match line.trim() {
        "s" => KeyCommand::Session(SessionCommand::ScanQr),
        "w" => KeyCommand::Session(SessionCommand::ChooseWallet),
        "r" => KeyCommand::Session(SessionCommand::Retry),
        "q" => KeyCommand::Quit,
        _ => return None,
    };
    Some(command)
}

/// `paystable checkout`
///
/// Runs one display session for the product with `gtin` until the payment
/// clears, the user quits or a shutdown signal arrives.
pub async fn checkout(
    client: BackendClient,
    config: &AppConfig,
    gtin: &str,
    qr: bool,
) -> anyhow::Result<()> {
    let product = client
        .list_products()
        .await?
        .into_iter()
        .find(|p| p.gtin == gtin)
        .ok_or_else(|| anyhow!("no product with GTIN {gtin}"))?;

    let controller = PaymentSessionController::new(Arc::new(client), config.flow.clone());
    let mut snapshots = controller.subscribe();
    let (commands, command_rx) = session_command_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(controller.run(shutdown_rx, command_rx));

    commands.send(SessionCommand::Open { product }).await?;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut switch_to_qr = qr;

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                signal?;
                break;
            }

            changed = snapshots.changed() => {
                if changed.is_err() {
                    tracing::warn!("Session controller stopped unexpectedly");
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if switch_to_qr && snapshot.state.kind() == PaymentStateKind::Paying {
                    switch_to_qr = false;
                    commands.send(SessionCommand::ScanQr).await?;
                    continue;
                }
                print!("{}", render_snapshot(&snapshot, &config.locale));
                if snapshot.state == PaymentState::PaymentCleared {
                    break;
                }
            }

            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => match parse_key(&line) {
                    Some(KeyCommand::Session(command)) => commands.send(command).await?,
                    Some(KeyCommand::Quit) => break,
                    None => println!("{KEY_HELP}"),
                },
                None => stdin_open = false,
            },
        }
    }

    if commands.send(SessionCommand::Close).await.is_ok() {
        let _ = snapshots.wait_for(|s| s.session.is_none()).await;
    }
    shutdown_tx.send_replace(true);
    handle.await?;
    Ok(())
}
