//! Types shared between the certadm API, its store and the operator CLI.

pub mod caller;
pub mod certificate;
pub mod params;
pub mod views;
