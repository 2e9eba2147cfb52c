//! Managed resources

pub mod certificate;
pub mod origin;

pub use certificate::CertificateResource;
pub use origin::OriginResource;
