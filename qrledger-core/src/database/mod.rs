pub mod memory;
#[cfg(feature = "database")]
#[cfg_attr(docsrs, doc(cfg(feature = "database")))]
pub mod postgres;
pub mod ports;

pub use memory::InMemoryQrCodeRepository;
#[cfg(feature = "database")]
pub use postgres::PostgresQrCodeRepository;
pub use ports::{NewQrRow, QrCodeRepository};
