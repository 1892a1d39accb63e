pub mod api;
pub mod client;

pub use api::ClinicApi;
pub use client::ClinicApiClient;
