//! Data sources

pub mod certificate;
pub mod origins;

pub use certificate::CertificateDataSource;
pub use origins::OriginsDataSource;
