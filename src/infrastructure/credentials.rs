use crate::domain::ports::CredentialVerifier;

/// Checks against a single configured username/password pair.
///
/// With no password configured every attempt is rejected.
pub struct StaticCredentialVerifier {
    username: String,
    password: Option<String>,
}

impl StaticCredentialVerifier {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

impl CredentialVerifier for StaticCredentialVerifier {
    fn verify(&self, username: &str, password: &str) -> bool {
        match &self.password {
            Some(expected) => username == self.username && password == expected,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_configured_pair_only() {
        let verifier = StaticCredentialVerifier::new("admin", Some("s3cret".to_string()));
        assert!(verifier.verify("admin", "s3cret"));
        assert!(!verifier.verify("admin", "S3CRET"));
        assert!(!verifier.verify("root", "s3cret"));
        assert!(!verifier.verify("", ""));
    }

    #[test]
    fn rejects_everything_without_a_password() {
        let verifier = StaticCredentialVerifier::new("admin", None);
        assert!(!verifier.verify("admin", ""));
        assert!(!verifier.verify("admin", "anything"));
    }
}
