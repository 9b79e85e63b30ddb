use rand::Rng;

/// Fixed catalog of messages the worker logs.
pub const MESSAGES: [&str; 6] = [
    "User signed in",
    "Cache cleared",
    "Email sent",
    "Session expired",
    "Data synced",
    "External API called",
];

/// Uniformly pick one catalog entry. Repeats are allowed.
pub fn pick_message<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    MESSAGES[rng.gen_range(0..MESSAGES.len())]
}
