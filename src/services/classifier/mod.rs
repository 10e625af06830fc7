pub mod confidence;
pub mod presenter;
pub mod recommendations;
pub mod risk;
