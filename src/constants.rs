/// Sessions expire 28 days after login (absolute, not sliding)
pub const SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 28;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "primary";

/// Usernames are 1..=20 characters
pub const MAX_USERNAME_LENGTH: usize = 20;

/// Minimum password length for signup, login and password change
pub const MIN_PASSWORD_LENGTH: usize = 10;

/// Collection, sub-collection and flashcard titles are 1..=60 characters
pub const MAX_TITLE_LENGTH: usize = 60;

/// Maximum serialized layer payload (the KV value limit is 25 MiB)
pub const MAX_LAYERS_SIZE_BYTES: usize = 25 * 1024 * 1024;

/// Log when a layer payload exceeds this size (1MB)
pub const WARN_LAYERS_SIZE_BYTES: usize = 1_048_576;

// =============================================================================
// Password Hashing
// =============================================================================

/// PBKDF2 iteration count for new digests
pub const PBKDF2_ITERATIONS: u32 = 30_000;

/// Hash function name recorded in new digests
pub const PBKDF2_HASH: &str = "SHA-256";

/// Digest checked when the username does not exist, so a missing user costs
/// the same derivation as a wrong password. No password matches it.
pub const DUMMY_PASSWORD_DIGEST: &str = "8119aa2efef908b5043e929420e3035672f88917fa7b4142eb549bbbf710e433::33324951230a64ed6cbe8970eab844af::SHA-256::30000";

// =============================================================================
// Error Messages
// =============================================================================

pub const ERR_AUTH_REQUIRED: &str = "User Auth Required";

pub const ERR_SIGNED_OUT_ONLY: &str = "Only signed out users can access";

pub const ERR_MISSING_CREDENTIALS: &str = "Missing username and/or password";

pub const ERR_USERNAME_LENGTH: &str =
    "Username must have length of at least 1 but no more than 20";

pub const ERR_USERNAME_COLON: &str = "Username cannot contain a colon (\":\")";

pub const ERR_PASSWORD_LENGTH: &str = "Password must be at least of length 10";

pub const ERR_USERNAME_TAKEN: &str = "Username already exists";

pub const ERR_BAD_CREDENTIALS: &str = "Username and/or password incorrect";

pub const ERR_TITLE_LENGTH: &str = "Title must have length of at least 1 but no more than 60";

pub const ERR_EXPECTED_JSON: &str = "Expected JSON Content-Type";

pub const ERR_EXPECTED_LAYERS: &str = "Expected a string of layers";
