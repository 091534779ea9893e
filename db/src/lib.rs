//! Record store for the certadm authority: certificate records, process-wide
//! configuration entries and the password primitives used to protect them.

pub mod models;
pub mod password;
pub mod storage;
