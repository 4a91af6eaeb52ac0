//! Entity module - Contains the `SeaORM` entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod license;

pub use license::{Column as LicenseColumn, Entity as License, Model as LicenseModel};
