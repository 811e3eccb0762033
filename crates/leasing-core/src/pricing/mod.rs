pub mod calculator;
pub mod equipment;
pub mod reverse;
