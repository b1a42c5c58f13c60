//! Authentication CLI command handlers

use secrecy::SecretString;

use crate::api::auth::{AuthApi, Registration, LOGIN_FALLBACK, REGISTER_FALLBACK};
use crate::cli::commands::AuthCommand;
use crate::cli::{connect, prompt};
use crate::error::Result;

/// Handle authentication commands
pub async fn handle_auth(command: AuthCommand) -> Result<()> {
    match command {
        AuthCommand::Login { email, password } => handle_login(email, password).await,
        AuthCommand::Logout => handle_logout(),
        AuthCommand::Status => handle_status(),
        AuthCommand::Register {
            firstname,
            lastname,
            email,
            dob,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt("Password")?,
            };
            let registration = Registration {
                firstname,
                lastname,
                email,
                dob,
                password: SecretString::from(password),
            };
            handle_register(registration).await
        }
    }
}

/// Handle the login command
async fn handle_login(email: String, password: Option<String>) -> Result<()> {
    let client = connect()?;

    let password = match password {
        Some(p) => p,
        None => prompt("Password")?,
    };
    let password = SecretString::from(password);

    let outcome = AuthApi::new(&client)
        .login(&email, &password)
        .await
        .map_err(|e| e.into_user_facing(LOGIN_FALLBACK))?;

    println!("✓ Logged in as {}", email.trim());
    if !outcome.persisted {
        println!();
        println!("  Warning: the token could not be stored.");
        println!("  Your session will not survive a restart.");
    }
    Ok(())
}

/// Handle the register command
async fn handle_register(registration: Registration) -> Result<()> {
    let client = connect()?;

    AuthApi::new(&client)
        .register(&registration)
        .await
        .map_err(|e| e.into_user_facing(REGISTER_FALLBACK))?;

    println!("✓ Registration successful!");
    println!();
    println!(
        "  Log in with: fuellog auth login --email {}",
        registration.email.trim()
    );
    Ok(())
}

/// Handle the logout command
fn handle_logout() -> Result<()> {
    let client = connect()?;

    if !client.session().has_credential() {
        println!("Not currently logged in.");
        return Ok(());
    }

    AuthApi::new(&client).logout()?;
    println!("Successfully logged out.");
    Ok(())
}

/// Handle the status command
fn handle_status() -> Result<()> {
    let client = connect()?;
    let session = client.session();

    println!("Authentication Status:");
    println!("  Server: {}", client.base_url());
    println!("  Storage: {}", session.backend_name());

    match session.masked() {
        Some(masked) => {
            println!("  Status: Logged in");
            println!("\n  Token: {}", masked);
        }
        None => println!("  Status: Not logged in"),
    }

    if session.is_degraded() {
        println!();
        println!("  Warning: credential storage is unavailable; the session is memory-only.");
    }
    Ok(())
}
