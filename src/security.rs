use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;

/// Constant-time string comparison to prevent timing attacks
/// Use this for comparing passwords and other sensitive values
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Split an `Authorization: Basic ...` header value into user and password.
pub fn parse_basic_auth(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?.trim();
    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// Check an `Authorization` header against the admin credentials.
///
/// Both parts are always compared so a wrong user name costs the same as a
/// wrong password.
pub fn verify_basic_auth(header: Option<&str>, user: &str, password: &str) -> bool {
    let Some((given_user, given_password)) = header.and_then(parse_basic_auth) else {
        return false;
    };
    let user_ok = constant_time_compare(&given_user, user);
    let password_ok = constant_time_compare(&given_password, password);
    user_ok & password_ok
}
