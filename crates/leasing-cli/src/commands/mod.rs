pub mod commission;
pub mod offers;
pub mod pricing;
