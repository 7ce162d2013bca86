// Convergence
pub mod apply;
pub mod destroy;
pub mod refresh;

// Inspection
pub mod attest;
pub mod import;
pub mod resolve;

#[cfg(test)]
pub(crate) mod testing;
