pub mod calendar;
pub mod messaging;
pub mod parser;
pub mod planner;
pub mod scheduling;
pub mod search;
pub mod weather;
