use crate::errors::FieldError;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 30;
pub const PASSWORD_MIN: usize = 6;
pub const API_KEY_MIN: usize = 10;

/// Username: 3–30 ASCII letters, digits or underscores.
pub fn validate_username(username: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        errors.push(FieldError::new(
            "username",
            format!("Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        errors.push(FieldError::new(
            "username",
            "Username can only contain letters, numbers, and underscores",
        ));
    }
    errors
}

/// Password: at least 6 characters with a lowercase letter, an uppercase
/// letter and a digit.
pub fn validate_password(password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if password.chars().count() < PASSWORD_MIN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {PASSWORD_MIN} characters long"),
        ));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least one uppercase letter, one lowercase letter, and one number",
        ));
    }
    errors
}

pub fn validate_registration(username: &str, password: &str) -> Result<(), Vec<FieldError>> {
    let mut errors = validate_username(username);
    errors.extend(validate_password(password));
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Login only checks presence; the credential check itself answers 401.
pub fn validate_login(username: &str, password: &str) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if username.trim().is_empty() {
        errors.push(FieldError::new("username", "Username is required"));
    }
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_api_key(api_key: &str) -> Result<(), Vec<FieldError>> {
    if api_key.chars().count() < API_KEY_MIN {
        return Err(vec![FieldError::new(
            "apiKey",
            "API key must be a valid string",
        )]);
    }
    Ok(())
}
