use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context as _};
use backgammon_client::{NewUser, UserProfile};
use tracing::info;

use super::{style, Context};

#[derive(clap::Args)]
pub struct LoginArgs {
    /// API token (for service authentication)
    #[arg(short, long, required_unless_present = "email", conflicts_with = "email")]
    pub token: Option<String>,

    /// Register a CLI user with this email address
    #[arg(short, long)]
    pub email: Option<String>,
}

pub fn login(context: &Context, args: &LoginArgs) -> anyhow::Result<()> {
    if let Some(current) = context.auth.current_user()? {
        if current.has_credentials() {
            match &current.email {
                Some(email) => println!(
                "{}",
                style::warning(format!("Replacing the current session of {}", email))
            ),
            None => println!("{}", style::warning("Replacing the current session")),
            }
        }
    }

    let profile = match (&args.token, &args.email) {
        (Some(token), _) => UserProfile {
            token: Some(token.clone()),
            auth_method: Some(String::from("api-token")),
            ..Default::default()
        },
        (None, Some(email)) => register_cli_user(context, email)?,
        (None, None) => bail!("Pass either --token or --email"),
    };

    context.auth.login(profile)?;
    info!(path = %context.auth.path().display(), "Stored credentials");
    println!("{}", style::success("✅ Logged in"));
    Ok(())
}

fn register_cli_user(context: &Context, email: &str) -> anyhow::Result<UserProfile> {
    if !is_plausible_email(email) {
        bail!("'{}' is not a valid email address", email);
    }
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    let external_id = format!("cli-user-{}", millis);
    let user = NewUser {
        source: String::from("cli"),
        external_id: external_id.clone(),
        email: String::from(email),
        given_name: String::from("CLI"),
        family_name: String::from("User"),
        locale: String::from("en-US"),
        user_type: String::from("human"),
    };
    let created = context
        .anonymous_client()?
        .create_or_update_user(&user)
        .context("Failed to create user")?;

    Ok(UserProfile {
        email: Some(user.email),
        first_name: Some(user.given_name),
        last_name: Some(user.family_name),
        user_id: created.id,
        token: Some(format!("cli|{}", external_id)),
        auth_method: Some(String::from("cli-email")),
        login_time: None,
    })
}

/// One `@` with something on both sides and a dot in the domain.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

pub fn logout(context: &Context) -> anyhow::Result<()> {
    context.auth.logout()?;
    println!("{}", style::success("Logged out"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_plausible_email("ada@example.com"));
        assert!(is_plausible_email("a.b@mail.example.org"));
        assert!(!is_plausible_email("ada"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("ada@example"));
        assert!(!is_plausible_email("ada@.com"));
        assert!(!is_plausible_email("a da@example.com"));
        assert!(!is_plausible_email("a@b@example.com"));
    }
}
