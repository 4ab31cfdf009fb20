use crate::config::AdminAccount;

/// The allow-list of dashboard admins, loaded once from config at startup.
/// Lookups are pure and case-sensitive; there is no runtime mutation, so
/// removing someone means editing the config and restarting.
pub struct AdminDirectory {
    admins: Vec<AdminAccount>,
}

impl AdminDirectory {
    #[must_use]
    pub const fn new(admins: Vec<AdminAccount>) -> Self {
        Self { admins }
    }

    #[must_use]
    pub fn find(&self, email: &str) -> Option<&AdminAccount> {
        self.admins.iter().find(|admin| admin.email == email)
    }

    /// Membership check the route gate runs on every request.
    #[must_use]
    pub fn is_authorized(&self, email: &str) -> bool {
        self.admins.iter().any(|admin| admin.email == email)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }
}
