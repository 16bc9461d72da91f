use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use sha2::{Digest, Sha256};
use shared::DoctorIdentity;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("{0} is required")]
    BlankField(&'static str),
    #[error("An account with this email already exists")]
    DuplicateEmail,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Credential store unavailable")]
    Unavailable,
}

#[derive(Debug, Clone)]
struct StoredUser {
    identity: DoctorIdentity,
    salt: [u8; 16],
    password_hash: String,
}

fn hash_password(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, CredentialError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CredentialError::BlankField(field))
    } else {
        Ok(trimmed)
    }
}

/// In-memory doctor accounts keyed by normalized email.
#[derive(Clone, Default)]
pub struct CredentialStore {
    users: Arc<RwLock<HashMap<String, StoredUser>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        email: &str,
        password: &str,
        doctor_id: &str,
        organization_id: &str,
    ) -> Result<DoctorIdentity, CredentialError> {
        let email = normalize_email(required(email, "Email")?);
        if password.is_empty() {
            return Err(CredentialError::BlankField("Password"));
        }
        let doctor_id = required(doctor_id, "Doctor ID")?;
        let organization_id = required(organization_id, "Organization ID")?;

        let mut users = self.users.write().map_err(|_| CredentialError::Unavailable)?;
        if users.contains_key(&email) {
            return Err(CredentialError::DuplicateEmail);
        }

        let salt: [u8; 16] = rand::random();
        let identity = DoctorIdentity {
            email: email.clone(),
            doctor_id: doctor_id.to_string(),
            organization_id: organization_id.to_string(),
        };
        users.insert(
            email,
            StoredUser {
                identity: identity.clone(),
                salt,
                password_hash: hash_password(&salt, password),
            },
        );
        log::info!("Registered doctor {}", identity.email);
        Ok(identity)
    }

    pub fn verify(&self, email: &str, password: &str) -> Result<DoctorIdentity, CredentialError> {
        let users = self.users.read().map_err(|_| CredentialError::Unavailable)?;
        let user = users
            .get(&normalize_email(email))
            .ok_or(CredentialError::InvalidCredentials)?;
        if hash_password(&user.salt, password) == user.password_hash {
            Ok(user.identity.clone())
        } else {
            Err(CredentialError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_verify() {
        let store = CredentialStore::new();
        let identity = store
            .register(" Doc@Clinic.org ", "hunter2", "D-7", "ORG-1")
            .unwrap();
        assert_eq!(identity.email, "doc@clinic.org");

        assert_eq!(store.verify("doc@clinic.org", "hunter2").unwrap(), identity);
        assert_eq!(
            store.verify("doc@clinic.org", "wrong"),
            Err(CredentialError::InvalidCredentials)
        );
        assert_eq!(
            store.verify("nobody@clinic.org", "hunter2"),
            Err(CredentialError::InvalidCredentials)
        );
    }

    #[test]
    fn rejects_duplicates_and_blank_fields() {
        let store = CredentialStore::new();
        store.register("a@b.c", "pw", "D", "O").unwrap();
        assert_eq!(
            store.register("A@B.C", "pw2", "D2", "O"),
            Err(CredentialError::DuplicateEmail)
        );
        assert_eq!(
            store.register(" ", "pw", "D", "O"),
            Err(CredentialError::BlankField("Email"))
        );
        assert_eq!(
            store.register("x@y.z", "", "D", "O"),
            Err(CredentialError::BlankField("Password"))
        );
        assert_eq!(
            store.register("x@y.z", "pw", "D", " "),
            Err(CredentialError::BlankField("Organization ID"))
        );
    }

    #[test]
    fn equal_passwords_hash_differently() {
        let store = CredentialStore::new();
        store.register("a@x.org", "same", "D1", "O").unwrap();
        store.register("b@x.org", "same", "D2", "O").unwrap();
        let users = store.users.read().unwrap();
        assert_ne!(users["a@x.org"].password_hash, users["b@x.org"].password_hash);
    }
}
