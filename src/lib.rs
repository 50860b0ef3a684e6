pub mod disks;
pub mod filter;
pub mod host;
pub mod inventory;
pub mod json_api;
pub mod report;
pub mod settings;

#[cfg(test)]
pub mod mocks;
