//! Wire types exchanged with the merchant backend.

pub mod checkout;
pub mod order;
pub mod product;

pub use checkout::{CheckoutItem, CheckoutRequest, PaymentProcessingDetails, WalletLink, WalletLogo};
pub use order::{OperationResult, OrderDetails, OrderStatus, PaymentStatus, ProductOrder};
pub use product::{Product, ProductList};
