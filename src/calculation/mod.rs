//! Calculation logic for the timesheet synchronization engine.
//!
//! This module contains the duration codec that turns the provider's signed
//! `HH:MM` strings into decimal hours, and the compliance classifier: risk
//! tiers, the overtime liability projection and the statutory compensation
//! deadline.

mod assessment;
mod compensation_deadline;
mod duration;
mod liability;
mod risk_tier;

pub use assessment::{ComplianceAssessment, assess_compliance};
pub use compensation_deadline::{CompensationRegime, compensation_deadline, days_remaining};
pub use duration::{format_duration, parse_duration};
pub use liability::{
    LiabilityProjection, OVERTIME_50_MULTIPLIER, OVERTIME_100_MULTIPLIER, project_liability,
};
pub use risk_tier::{
    ATTENTION_THRESHOLD_HOURS, CRITICAL_THRESHOLD_HOURS, RiskTier, classify_balance,
};
