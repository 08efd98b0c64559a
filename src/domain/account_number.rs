use rand::Rng;

/// Characters an account number is drawn from.
pub const ACCOUNT_NUMBER_ALPHABET: &[u8] = b"0123456789";

/// Length of every generated account number.
pub const ACCOUNT_NUMBER_LENGTH: usize = 10;

/// Generate a random account number using the thread-local RNG.
///
/// Nothing here guarantees uniqueness; callers retry on collision.
pub fn generate_account_number() -> String {
    generate_account_number_with(&mut rand::rng())
}

/// Generate an account number from the given RNG.
pub fn generate_account_number_with<R: Rng>(rng: &mut R) -> String {
    (0..ACCOUNT_NUMBER_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..ACCOUNT_NUMBER_ALPHABET.len());
            ACCOUNT_NUMBER_ALPHABET[idx] as char
        })
        .collect()
}
