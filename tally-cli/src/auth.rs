use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{self, Write};

use crate::store::{KeyValueStore, read_json, try_read_json, write_json};

const KEY_USERS: &str = "tally_users";
const KEY_SESSION: &str = "tally_current_user";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    #[serde(flatten)]
    user: User,
    password_sha256: String,
}

fn digest(email: &str, password: &str) -> String {
    Sha256::digest(format!("{email}:{password}").as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn load_users<S: KeyValueStore + ?Sized>(store: &S) -> Vec<StoredUser> {
    read_json(store, KEY_USERS)
}

/// Logged-in user, without credentials.
pub fn current_user<S: KeyValueStore + ?Sized>(store: &S) -> Option<User> {
    read_json(store, KEY_SESSION)
}

fn set_current_user<S: KeyValueStore + ?Sized>(store: &S, user: &User) -> Result<()> {
    write_json(store, KEY_SESSION, &Some(user))
}

/// Create an account and log it in.
pub fn register<S: KeyValueStore + ?Sized>(
    store: &S,
    name: &str,
    email: &str,
    password: &str,
) -> Result<User> {
    let name = name.trim();
    let email = normalize_email(email);
    if name.is_empty() {
        bail!("name is required");
    }
    let email_re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").context("compile email pattern")?;
    if !email_re.is_match(&email) {
        bail!("'{email}' doesn't look like an email address");
    }
    if password.is_empty() {
        bail!("password is required");
    }

    let mut users: Vec<StoredUser> = try_read_json(store, KEY_USERS)
        .context("refusing to overwrite the user list")?
        .unwrap_or_default();
    if users.iter().any(|u| u.user.email == email) {
        bail!("That email is already registered.");
    }

    let user = User {
        id: format!("user_{}", chrono::Utc::now().timestamp_millis()),
        name: name.to_string(),
        email: email.clone(),
    };
    users.push(StoredUser {
        user: user.clone(),
        password_sha256: digest(&email, password),
    });
    write_json(store, KEY_USERS, &users)?;
    set_current_user(store, &user)?;

    log::info!("registered {}", user.id);
    Ok(user)
}

pub fn login<S: KeyValueStore + ?Sized>(store: &S, email: &str, password: &str) -> Result<User> {
    let email = normalize_email(email);
    let hashed = digest(&email, password);
    let Some(found) = load_users(store)
        .into_iter()
        .find(|u| u.user.email == email && u.password_sha256 == hashed)
    else {
        log::warn!("failed login for {email}");
        bail!("Invalid credentials.");
    };

    set_current_user(store, &found.user)?;
    Ok(found.user)
}

pub fn logout<S: KeyValueStore + ?Sized>(store: &S) -> Result<()> {
    store.remove(KEY_SESSION)
}

/// Minimal portable secret prompt: just stdin.
pub fn prompt_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn register_logs_in_without_storing_password() {
        let store = MemoryStore::default();
        let user = register(&store, "Ana", "Ana@Example.com", "hunter2").unwrap();
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(current_user(&store), Some(user));

        let raw = store.get(KEY_USERS).unwrap().unwrap();
        assert!(!raw.contains("hunter2"));
        let session = store.get(KEY_SESSION).unwrap().unwrap();
        assert!(!session.contains("password"));
    }

    #[test]
    fn duplicate_email_rejected() {
        let store = MemoryStore::default();
        register(&store, "Ana", "ana@example.com", "pw").unwrap();
        let err = register(&store, "Other", "ANA@example.com", "pw2").unwrap_err();
        assert_eq!(err.to_string(), "That email is already registered.");
    }

    #[test]
    fn invalid_input_rejected() {
        let store = MemoryStore::default();
        assert!(register(&store, "Ana", "not-an-email", "pw").is_err());
        assert!(register(&store, " ", "ana@example.com", "pw").is_err());
        assert!(register(&store, "Ana", "ana@example.com", "").is_err());
    }

    #[test]
    fn login_and_logout() {
        let store = MemoryStore::default();
        let user = register(&store, "Ana", "ana@example.com", "pw").unwrap();
        logout(&store).unwrap();
        assert_eq!(current_user(&store), None);

        let err = login(&store, "ana@example.com", "wrong").unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials.");
        assert_eq!(current_user(&store), None);

        assert_eq!(login(&store, " ana@example.com ", "pw").unwrap(), user);
        assert_eq!(current_user(&store), Some(user));
    }

    #[test]
    fn register_keeps_unreadable_user_list() {
        let store = MemoryStore::default();
        store.set(KEY_USERS, "[{broken").unwrap();
        assert!(register(&store, "Ana", "ana@example.com", "pw").is_err());
        assert_eq!(store.get(KEY_USERS).unwrap().as_deref(), Some("[{broken"));
        assert_eq!(current_user(&store), None);
    }
}
