mod add_certificate;
mod admin_password;

pub use add_certificate::*;
pub use admin_password::*;
