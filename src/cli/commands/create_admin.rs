//! Create admin command handler

use crate::config::Config;
use crate::db::Store;
use crate::db::repositories::user::hash_password_blocking;
use crate::domain::Role;

pub async fn cmd_create_admin(config: &Config, email: &str, password: &str) -> anyhow::Result<()> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        anyhow::bail!("Email and password are required");
    }

    let store = Store::new(&config.general.database_url).await?;

    if store.get_user_by_email(email).await?.is_some() {
        anyhow::bail!("Email already registered: {email}");
    }

    let hash = hash_password_blocking(password, &config.security).await?;
    let user = store.create_user(email, hash, Role::Admin).await?;

    println!("✓ Admin account created (id {}, {})", user.id, user.email);
    Ok(())
}
