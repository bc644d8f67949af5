pub mod energy;
pub mod metrics;
pub mod tariff;
pub mod viability;
