//! Statutory Calculation Engine for UK payroll and employment law.
//!
//! This crate provides pure calculators for pro-rata salary, commission,
//! notice periods, statutory maternity and paternity pay, pension
//! contributions, redundancy pay and term-time-only salary. Statutory
//! constants are loaded per tax year from YAML configuration.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod validation;
