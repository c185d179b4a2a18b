//! Daily-interest loan terms: the single place the platform derives totals,
//! daily installments and interest from a principal, a daily rate and a term.

pub mod calculator;
pub mod schedule;
