//! Route definitions shared by the server router and the client.

macro_rules! qrcodes_path {
    ($path:literal) => {
        concat!("/api/qrcodes", $path)
    };
}

pub mod qrcodes {
    pub const COLLECTION: &str = qrcodes_path!("/");
    pub const ITEM: &str = qrcodes_path!("/{id}/");
    pub const VERIFY: &str = qrcodes_path!("/verify/");
    pub const STATS: &str = qrcodes_path!("/stats/");

    /// Concrete path of a single record.
    pub fn item(id: crate::QrRecordId) -> String {
        super::utils::replace_param(ITEM, "{id}", id.to_string())
    }
}

/// Every registry endpoint lives under this prefix.
pub const API_PREFIX: &str = "/api/";
pub const HEALTH: &str = "/health";
pub const INDEX: &str = "/";
pub const STATIC_PREFIX: &str = "/static";

pub mod utils {
    /// Replace a single path parameter (e.g. `"{id}"`) with the provided value.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, value.as_ref())
    }
}
