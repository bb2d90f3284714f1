/// Longest code the prompt accepts.
pub const MAX_PIN_LEN: usize = 4;

/// Fixed-code gate in front of the welcome-message editor.
///
/// The secret ships with the kiosk configuration, so this only keeps casual
/// passers-by out of the editor. It is not an access-control boundary.
#[derive(Clone)]
pub struct PinGate {
    secret: String,
}

impl PinGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    /// Exact, case-sensitive comparison.
    pub fn check(&self, entered: &str) -> bool {
        entered == self.secret
    }
}

// Keep the secret out of logs and panics.
impl std::fmt::Debug for PinGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinGate").finish_non_exhaustive()
    }
}
