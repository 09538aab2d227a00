use rand::distributions::Alphanumeric;
use rand::Rng;

/// Random tag used to tell log files of different runs apart.
pub fn random_tag(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Correlation id for one simulation run: the seed in hex plus a short tag,
/// e.g. `2a-Xk3q9P`.
pub fn run_correlation_id(seed: u64) -> String {
    format!("{:x}-{}", seed, random_tag(6))
}
