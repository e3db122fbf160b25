/// Staff credential check used by the login endpoint.
///
/// Kept apart from the order and inventory services; nothing in the core
/// depends on it.
pub trait CredentialVerifier: Send + Sync + 'static {
    fn verify(&self, username: &str, password: &str) -> bool;
}
