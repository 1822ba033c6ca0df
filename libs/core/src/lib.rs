// Core library for strata

pub mod telemetry;
