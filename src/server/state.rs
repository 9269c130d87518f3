use crate::catalog::Catalog;

/// Shared server state. The catalog is immutable after load, so no
/// locking is needed; every request reads the same table.
pub struct AppState {
    pub catalog: Catalog,
    pub access_key: Option<String>,
}
