pub mod normalize;
pub mod participant;
pub mod record;
