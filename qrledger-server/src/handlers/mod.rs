pub mod health;
pub mod qrcodes;
