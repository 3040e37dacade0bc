use uuid::Uuid;

/// The acting user for a single request, or anonymous.
///
/// Threaded explicitly into every handler and query call - never read from
/// ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer(Option<Uuid>);

impl Viewer {
    pub const fn anonymous() -> Self {
        Self(None)
    }

    pub const fn user(id: Uuid) -> Self {
        Self(Some(id))
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.0
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }

    /// Whether this viewer is the user identified by `author_id`.
    pub fn owns(&self, author_id: Uuid) -> bool {
        self.0 == Some(author_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_owns_nothing() {
        let viewer = Viewer::anonymous();
        assert!(!viewer.is_authenticated());
        assert!(!viewer.owns(Uuid::new_v4()));
    }

    #[test]
    fn user_owns_only_itself() {
        let id = Uuid::new_v4();
        let viewer = Viewer::user(id);
        assert!(viewer.is_authenticated());
        assert!(viewer.owns(id));
        assert!(!viewer.owns(Uuid::new_v4()));
    }
}
