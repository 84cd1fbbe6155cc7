use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Length of generated paste ids. 62^12 is roughly 2^71 possible ids.
pub const KEY_LENGTH: usize = 12;

/// Generate a random alphanumeric paste id.
pub fn generate_key() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_LENGTH)
        .map(char::from)
        .collect()
}
