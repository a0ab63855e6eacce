//! Tests for the booking availability engine

#[cfg(test)]
mod support;
#[cfg(test)]
mod service_tests;
#[cfg(test)]
mod property_tests;
