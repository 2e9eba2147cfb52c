//! Certificate model

use cachefly_client::{Certificate, CreateCertificateRequest};
use cachefly_core::resource::{Attributes, Value};

use super::{attr, string_or_empty};

/// State of a `cachefly_certificate` resource or data source
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateModel {
    pub id: Value,
    pub certificate: Value,
    pub certificate_key: Value,
    pub password: Value,
    pub subject_common_name: Value,
    pub subject_names: Value,
    pub expired: Value,
    pub expiring: Value,
    pub in_use: Value,
    pub managed: Value,
    pub services: Value,
    pub domains: Value,
    pub not_before: Value,
    pub not_after: Value,
    pub created_at: Value,
}

impl CertificateModel {
    pub fn from_attributes(attributes: &Attributes) -> Self {
        Self {
            id: attr(attributes, "id"),
            certificate: attr(attributes, "certificate"),
            certificate_key: attr(attributes, "certificate_key"),
            password: attr(attributes, "password"),
            subject_common_name: attr(attributes, "subject_common_name"),
            subject_names: attr(attributes, "subject_names"),
            expired: attr(attributes, "expired"),
            expiring: attr(attributes, "expiring"),
            in_use: attr(attributes, "in_use"),
            managed: attr(attributes, "managed"),
            services: attr(attributes, "services"),
            domains: attr(attributes, "domains"),
            not_before: attr(attributes, "not_before"),
            not_after: attr(attributes, "not_after"),
            created_at: attr(attributes, "created_at"),
        }
    }

    /// Attributes for the resource schema
    pub fn into_attributes(self) -> Attributes {
        let mut attributes = self.computed_attributes();
        attributes.insert("certificate".to_string(), self.certificate);
        attributes.insert("certificate_key".to_string(), self.certificate_key);
        attributes.insert("password".to_string(), self.password);
        attributes
    }

    /// Attributes the API reports, without the uploaded key material
    pub fn computed_attributes(&self) -> Attributes {
        [
            ("id", &self.id),
            ("subject_common_name", &self.subject_common_name),
            ("subject_names", &self.subject_names),
            ("expired", &self.expired),
            ("expiring", &self.expiring),
            ("in_use", &self.in_use),
            ("managed", &self.managed),
            ("services", &self.services),
            ("domains", &self.domains),
            ("not_before", &self.not_before),
            ("not_after", &self.not_after),
            ("created_at", &self.created_at),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }

    /// Build the upload request. An unset password is not sent.
    pub fn to_create_request(&self) -> CreateCertificateRequest {
        CreateCertificateRequest {
            certificate: string_or_empty(&self.certificate),
            certificate_key: string_or_empty(&self.certificate_key),
            password: string_or_empty(&self.password),
        }
    }

    /// Copy the API's view of the certificate into the model.
    /// Key material is left untouched since the API never returns it.
    pub fn apply_certificate(&mut self, cert: &Certificate) {
        self.id = Value::String(cert.id.clone());
        self.subject_common_name = Value::String(cert.subject_common_name.clone());
        self.subject_names = Value::string_set(cert.subject_names.iter().cloned());
        self.expired = Value::Bool(cert.expired);
        self.expiring = Value::Bool(cert.expiring);
        self.in_use = Value::Bool(cert.in_use);
        self.managed = Value::Bool(cert.managed);
        self.services = Value::string_set(cert.services.iter().cloned());
        self.domains = Value::string_set(cert.domains.iter().cloned());
        self.not_before = Value::String(cert.not_before.clone());
        self.not_after = Value::String(cert.not_after.clone());
        self.created_at = Value::String(cert.created_at.clone());
    }

    /// Build a model from an API response alone
    pub fn from_certificate(cert: &Certificate) -> Self {
        let mut model = Self::from_attributes(&Attributes::new());
        model.apply_certificate(cert);
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Certificate {
        Certificate {
            id: "64ab".to_string(),
            subject_common_name: "www.example.com".to_string(),
            subject_names: vec!["www.example.com".to_string(), "example.com".to_string()],
            expired: false,
            expiring: true,
            in_use: true,
            managed: false,
            services: vec![],
            domains: vec!["www.example.com".to_string()],
            not_before: "2024-01-01T00:00:00Z".to_string(),
            not_after: "2025-01-01T00:00:00Z".to_string(),
            created_at: String::new(),
        }
    }

    #[test]
    fn apply_keeps_key_material() {
        let mut attrs = Attributes::new();
        attrs.insert("certificate".to_string(), Value::String("cert-pem".into()));
        attrs.insert("certificate_key".to_string(), Value::String("key-pem".into()));
        let mut model = CertificateModel::from_attributes(&attrs);

        model.apply_certificate(&sample());

        assert_eq!(model.id, Value::String("64ab".into()));
        assert_eq!(model.certificate, Value::String("cert-pem".into()));
        assert_eq!(model.certificate_key, Value::String("key-pem".into()));
        assert_eq!(model.password, Value::Null);
        assert_eq!(
            model.subject_names,
            Value::string_set(["example.com", "www.example.com"])
        );
        assert_eq!(model.services, Value::Set(vec![]));
        assert_eq!(model.created_at, Value::String(String::new()));
    }

    #[test]
    fn create_request_from_plan() {
        let mut attrs = Attributes::new();
        attrs.insert("certificate".to_string(), Value::String("cert-pem".into()));
        attrs.insert("certificate_key".to_string(), Value::String("key-pem".into()));
        attrs.insert("password".to_string(), Value::Null);
        attrs.insert("id".to_string(), Value::Unknown);

        let req = CertificateModel::from_attributes(&attrs).to_create_request();
        assert_eq!(req.certificate, "cert-pem");
        assert_eq!(req.certificate_key, "key-pem");
        assert!(req.password.is_empty());
    }

    #[test]
    fn computed_attributes_exclude_secrets() {
        let model = CertificateModel::from_certificate(&sample());
        let computed = model.computed_attributes();
        assert!(!computed.contains_key("certificate_key"));
        assert_eq!(computed.len(), 12);
        assert_eq!(model.into_attributes().len(), 15);
    }
}
