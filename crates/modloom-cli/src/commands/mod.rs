pub mod load;
pub mod order;
pub mod resolve;
pub mod toggle;
