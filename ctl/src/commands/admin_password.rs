use anyhow::bail;
use certadm_db::{
    models::ADMIN_PASSWORD_KEY,
    password::{DEFAULT_ADMIN_PASSWORD, hash_password},
    storage::ConfigStore,
};
use clap::Parser;

#[derive(Clone, Parser)]
pub struct SetAdminPasswordParams {
    #[clap(short, long)]
    pub password: String,
}

/// Store the default admin password unless one is already set.
///
/// The API refuses gated requests until the operator replaces it.
pub async fn seed_admin_password(stg: &impl ConfigStore) -> anyhow::Result<()> {
    if stg.get_config(ADMIN_PASSWORD_KEY).await?.is_some() {
        println!("Admin password already set, leaving it alone");
        return Ok(());
    }

    stg.set_config(ADMIN_PASSWORD_KEY, &hash_password(DEFAULT_ADMIN_PASSWORD)?)
        .await?;
    println!("Admin password set to the default; change it with `set-admin-password`");

    Ok(())
}

pub async fn set_admin_password(
    stg: &impl ConfigStore,
    SetAdminPasswordParams { password }: SetAdminPasswordParams,
) -> anyhow::Result<()> {
    if password == DEFAULT_ADMIN_PASSWORD {
        bail!("refusing to set the admin password to the well-known default");
    }

    stg.set_config(ADMIN_PASSWORD_KEY, &hash_password(&password)?)
        .await?;
    println!("Admin password updated");

    Ok(())
}
