pub mod availability;
pub mod health;
pub mod parse;
pub mod schedule;
pub mod search;
pub mod webhook;
