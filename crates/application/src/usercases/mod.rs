pub mod auto_renewal;
pub mod expiry_sweeper;
pub mod history;
pub mod orders;
pub mod payments;
pub mod plans;
pub mod pricing;
pub mod region_detection;
pub mod subscriptions;

#[cfg(test)]
pub(crate) mod test_support;
