pub mod aggregation;
pub mod netting;
