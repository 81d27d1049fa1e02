use swiftbill_db::Database;

/// Database handle shared by every command.
///
/// `Database` is cheap to clone; the window shell keeps one `DbState` for
/// the lifetime of the app.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// ## Usage
    /// ```rust,ignore
    /// let clients = state.inner().clients().list();
    /// ```
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
