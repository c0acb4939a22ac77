//! Session command handlers

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::handlers::output::{print_json, print_user, settle};
use crate::handlers::HandlerResult;
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::services::{ServiceFactory, ServiceFailure, ServiceResponse};
use crate::utils::errors::EventSphereError;

/// Handle `login`
pub async fn handle_login(services: &ServiceFactory, username: String, password: Option<String>) -> HandlerResult {
    let password = password_or_stdin(password).await?;
    let credentials = LoginRequest { username, password };

    let user = settle(services.auth_service.login(&credentials).await)?;
    println!("Logged in as {}", user.username.as_deref().unwrap_or("user"));

    // The login response carries only the token; the profile fills in the rest.
    if let ServiceResponse::Failure(failure) = services.user_service.fetch_profile_and_sync().await {
        debug!(reason = %failure, "Profile not synchronized after login");
    }
    Ok(())
}

/// Handle `register`
pub async fn handle_register(
    services: &ServiceFactory,
    name: String,
    username: String,
    email: String,
    password: Option<String>,
) -> HandlerResult {
    let password = password_or_stdin(password).await?;
    let request = RegisterRequest {
        name,
        username,
        email,
        password,
    };
    settle(services.auth_service.register(&request).await)?;
    println!("You can now log in with `eventsphere login {}`", request.username);
    Ok(())
}

/// Handle `logout`
pub async fn handle_logout(services: &ServiceFactory) -> HandlerResult {
    settle(services.auth_service.logout().await)?;
    println!("Logged out");
    Ok(())
}

/// Handle `whoami`
pub async fn handle_whoami(services: &ServiceFactory, refresh: bool, json: bool) -> HandlerResult {
    let user: User = if refresh {
        settle(services.user_service.fetch_profile_and_sync().await)?
    } else {
        match services.auth_service.current_user().await {
            Some(stored) => stored.merge(&Default::default()),
            None => {
                println!("Not logged in");
                return Ok(());
            }
        }
    };

    if json {
        print_json(&user);
    } else {
        print_user(&user);
    }
    Ok(())
}

/// Use the given password, or read one line from stdin
pub(crate) async fn password_or_stdin(password: Option<String>) -> Result<String, ServiceFailure> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    let mut line = String::new();
    let mut reader = BufReader::new(tokio::io::stdin());
    if let Err(e) = reader.read_line(&mut line).await {
        return Err(ServiceFailure::from_error(&EventSphereError::from(e), "read_password"));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
