use std::sync::LazyLock;

use regex::Regex;

use crate::utils::error::CustomError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]{3,30}$").expect("valid username pattern"));

pub fn validate_email(email: &str) -> Result<(), CustomError> {
    if !EMAIL_RE.is_match(email) {
        return Err(CustomError::ValidationError("Email address is not valid.".into()));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), CustomError> {
    if !USERNAME_RE.is_match(username) {
        return Err(CustomError::ValidationError(
            "Username must be 3 to 30 letters, digits, '.', '_' or '-'.".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), CustomError> {
    // the auth provider hashes with bcrypt, which ignores bytes past 72
    if password.len() < 8 || password.len() > 72 {
        return Err(CustomError::ValidationError(
            "Password must be between 8 and 72 characters long.".into(),
        ));
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_letter || !has_digit {
        return Err(CustomError::ValidationError(
            "Password must include at least one letter and one number.".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(validate_email("fan@paddock.io").is_ok());
        assert!(validate_email("fan@paddock").is_err());
        assert!(validate_email("fan paddock@x.io").is_err());
    }

    #[test]
    fn password_policy() {
        assert!(validate_password("monza1955").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("nodigitshere").is_err());
        assert!(validate_password("1234567890").is_err());
    }

    #[test]
    fn username_charset() {
        assert!(validate_username("senna_88").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }
}
