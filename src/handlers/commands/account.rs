//! Account command handlers

use super::session::password_or_stdin;
use super::AccountCommand;
use crate::handlers::output::settle;
use crate::handlers::HandlerResult;
use crate::services::ServiceFactory;

/// Handle `account <subcommand>`
pub async fn handle_account(services: &ServiceFactory, cmd: AccountCommand) -> HandlerResult {
    let users = &services.user_service;
    match cmd {
        AccountCommand::Name { name } => settle(users.update_name(&name).await),
        AccountCommand::Email { email } => settle(users.update_email(&email).await),
        AccountCommand::Username { username } => settle(users.update_username(&username).await),
        AccountCommand::Password { current, new } => settle(users.update_password(&current, &new).await),
        AccountCommand::Photo { path } => {
            let photo = settle(users.upload_user_photo(&path).await)?;
            if photo.is_none() {
                println!("The server did not return the new photo");
            }
            Ok(())
        }
        AccountCommand::RemovePhoto => settle(users.remove_user_photo().await),
        AccountCommand::Delete { password } => {
            let password = password_or_stdin(password).await?;
            settle(users.delete_account(&password).await)
        }
    }
}
