use paystable_sdk::fiat::{FiatAmount, NumberLocale};
use paystable_sdk::objects::{PaymentProcessingDetails, Product, WalletLink};

use super::state::PaymentState;

/// Which half of the checkout view is shown.
///
/// Switching has no effect on the payment itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// List of wallet links to open.
    #[default]
    ChooseWallet,
    /// QR code of the deep link, to scan with a wallet on another device.
    ScanQr,
}

/// Everything needed to render the checkout step of the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutView {
    pub order_id: String,
    pub qr: String,
    pub deep_link: String,
    pub wallet_links: Vec<WalletLink>,
    pub fiat_price: FiatAmount,
    pub fiat_currency: String,
    pub demo_mode: bool,
    pub mode: ViewMode,
}

impl CheckoutView {
    /// Build the view for `product` being paid with `details`, starting on the
    /// wallet list.
    pub fn new(details: &PaymentProcessingDetails, product: &Product, demo_mode: bool) -> Self {
        Self {
            order_id: details.order_id.clone(),
            qr: details.qr.clone(),
            deep_link: details.deep_link.clone(),
            wallet_links: details.wallet_links.clone(),
            fiat_price: product.price,
            fiat_currency: product.currency.clone(),
            demo_mode,
            mode: ViewMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ViewMode) -> Self {
        self.mode = mode;
        self
    }

    /// "Scan QR".
    pub fn scan_qr(&mut self) {
        self.mode = ViewMode::ScanQr;
    }

    /// "Open in wallet".
    pub fn choose_wallet(&mut self) {
        self.mode = ViewMode::ChooseWallet;
    }

    /// Total price as shown to the user, e.g. `1,000.00 USD`.
    pub fn price_label(&self, locale: &NumberLocale) -> String {
        format!(
            "{} {}",
            self.fiat_price.to_human_friendly(locale),
            self.fiat_currency
        )
    }
}

/// What the modal shows for a given session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalView {
    #[default]
    Hidden,
    /// Waiting for the backend; `title` is the product name.
    Loading { title: String },
    Checkout { title: String, view: CheckoutView },
    /// "Paid successfully!"
    Cleared { title: String },
}

impl ModalView {
    /// Project a session onto its modal content.
    ///
    /// `product` is `None` only while no session is open, in which case the
    /// modal is hidden whatever `state` says.
    pub fn project(
        state: &PaymentState,
        product: Option<&Product>,
        mode: ViewMode,
        demo_mode: bool,
    ) -> Self {
        let Some(product) = product else {
            return ModalView::Hidden;
        };
        let title = product.name.clone();
        match state {
            PaymentState::Inactive => ModalView::Hidden,
            PaymentState::FetchingProcessingDetails => ModalView::Loading { title },
            PaymentState::Paying(details) => ModalView::Checkout {
                title,
                view: CheckoutView::new(details, product, demo_mode).with_mode(mode),
            },
            PaymentState::PaymentCleared => ModalView::Cleared { title },
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, ModalView::Hidden)
    }
}
