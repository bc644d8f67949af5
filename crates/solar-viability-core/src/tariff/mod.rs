pub mod resolver;
pub mod schedule;

pub use resolver::{CreditPolicy, TariffClass};
pub use schedule::RegulatorySchedule;
