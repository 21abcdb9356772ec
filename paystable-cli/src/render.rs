//! Plain-text rendering of the checkout modal.

use paystable_core::events::SessionSnapshot;
use paystable_core::flow::{CheckoutView, ModalView, ViewMode};
use paystable_sdk::fiat::NumberLocale;
use paystable_sdk::objects::{PaymentStatus, Product};
use qrcode::QrCode;
use qrcode::render::unicode::Dense1x2;
use std::fmt::Write;

/// Key bindings read from stdin during `paystable checkout`.
pub const KEY_HELP: &str = "[s] scan QR  [w] wallets  [r] retry  [q] close";

/// Render a session snapshot. Returns an empty string while the modal is
/// hidden.
pub fn render_snapshot(snapshot: &SessionSnapshot, locale: &NumberLocale) -> String {
    let mut out = String::new();
    match &snapshot.view {
        ModalView::Hidden => return out,
        ModalView::Loading { title } => {
            let _ = writeln!(out, "== {title} ==");
            out.push_str("Preparing payment...\n");
        }
        ModalView::Checkout { title, view } => {
            let _ = writeln!(out, "== {title} ==");
            render_checkout(&mut out, view, locale);
        }
        ModalView::Cleared { title } => {
            let _ = writeln!(out, "== {title} ==");
            out.push_str("Paid successfully!\n");
            return out;
        }
    }
    if let Some(error) = &snapshot.last_error {
        let _ = writeln!(out, "Error: {error}");
    }
    let _ = writeln!(out, "{KEY_HELP}");
    out
}

fn render_checkout(out: &mut String, view: &CheckoutView, locale: &NumberLocale) {
    let _ = writeln!(out, "Total: {}", view.price_label(locale));
    if view.demo_mode {
        out.push_str("DEMO MODE: no real funds will move\n");
    }
    match view.mode {
        ViewMode::ChooseWallet => {
            if view.wallet_links.is_empty() {
                out.push_str("No wallets offered, scan the QR code instead.\n");
            } else {
                out.push_str("Open in wallet:\n");
                for (i, wallet) in view.wallet_links.iter().enumerate() {
                    let _ = writeln!(out, "  {}. {}: {}", i + 1, wallet.wallet_name, wallet.link);
                }
            }
        }
        ViewMode::ScanQr => {
            out.push_str("Scan with your wallet:\n");
            match QrCode::new(view.deep_link.as_bytes()) {
                Ok(code) => {
                    let _ = writeln!(out, "{}", render_qr(&code));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Deep link does not fit a QR code");
                    let _ = writeln!(out, "  {}", view.qr);
                }
            }
        }
    }
    let _ = writeln!(out, "Deep link: {}", view.deep_link);
}

/// Two modules per character cell, light on dark so it scans on a dark
/// terminal.
fn render_qr(code: &QrCode) -> String {
    code.render::<Dense1x2>()
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .build()
}

/// One catalog line: `gtin  name  price currency`.
pub fn render_product(product: &Product, locale: &NumberLocale) -> String {
    format!(
        "{}  {}  {} {}",
        product.gtin,
        product.name,
        product.price.to_human_friendly(locale),
        product.currency
    )
}

pub fn render_payment_status(status: &PaymentStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "status: {}", status.status);
    if !status.merchant_address.is_empty() {
        let _ = writeln!(out, "merchant: {}", status.merchant_address);
    }
    let _ = writeln!(out, "payout available: {}", status.can_payout);
    let _ = writeln!(out, "refund available: {}", status.can_refund);
    let _ = writeln!(out, "chain transactions: {}", status.chain_txs.len());
    out
}
