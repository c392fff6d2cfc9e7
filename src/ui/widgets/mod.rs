//! Custom widgets

pub mod risk_chart;

pub use risk_chart::{risk_color, RiskChart};
