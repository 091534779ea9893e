use certadm_db::{models::DbCertificate, storage::CertificateStore};
use clap::Parser;

#[derive(Clone, Parser)]
pub struct AddCertificateParams {
    #[clap(short, long)]
    pub serial: i64,

    /// Subject distinguished name, ending in `CN=<name>`
    #[clap(short, long)]
    pub dn: String,
}

pub async fn add_certificate(
    stg: &impl CertificateStore,
    AddCertificateParams { serial, dn }: AddCertificateParams,
) -> anyhow::Result<()> {
    let created = stg.insert(DbCertificate::issued(serial, dn)).await?;

    println!("Recorded certificate {}", created);

    Ok(())
}
