// Dose reminder module: decides when a medicine needs announcing.
//
// Architecture:
// - model.rs: Reminder configuration, sounds and the alert payload
// - engine.rs: Walks the household and fires at most one alert per check

pub mod engine;
pub mod model;
