pub mod purchase;

pub use purchase::{PurchaseService, Receipt};
