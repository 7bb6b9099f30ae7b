//! End-to-end tests of the single-axis and two-axis provers.

#[cfg(test)]
mod tests;
