pub mod account;
pub mod categories;
pub mod common;
pub mod stocks;
pub mod sync;
