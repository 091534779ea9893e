use certadm_db::storage::mongodb::MongoDBStorage;
use clap::{Parser, Subcommand};

use crate::commands::{AddCertificateParams, SetAdminPasswordParams};

mod commands;

#[derive(Parser)]
pub struct Args {
    #[clap(subcommand)]
    command: Command,

    #[clap(
        short = 'D',
        long,
        env = "CERTADM_DB_URL",
        default_value = "mongodb://localhost:27017/certadm"
    )]
    db_url: String,
}

#[derive(Clone, Subcommand)]
pub enum Command {
    /// Prepare a new database: serial number index and the initial admin
    /// password.
    #[command(name = "init")]
    Init,

    /// Replace the admin password, lifting the default-credential block.
    #[command(name = "set-admin-password")]
    SetAdminPassword(SetAdminPasswordParams),

    /// Record an issued certificate as valid.
    #[command(name = "add-certificate")]
    AddCertificate(AddCertificateParams),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let stg = MongoDBStorage::new(&args.db_url).await?;

    match args.command {
        Command::Init => {
            stg.ensure_indexes().await?;
            commands::seed_admin_password(&stg).await?;
        }
        Command::SetAdminPassword(params) => commands::set_admin_password(&stg, params).await?,
        Command::AddCertificate(params) => commands::add_certificate(&stg, params).await?,
    }

    Ok(())
}
