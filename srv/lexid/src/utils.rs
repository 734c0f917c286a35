use actix_web::HttpRequest;
use rand::seq::SliceRandom;

/// Identity used when a request carries no forwarding headers
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Check if a word is made only of allowed letters (case insensitive)
pub fn uses_only_letters(word: &str, allowed: &[char]) -> bool {
    word.to_uppercase().chars().all(|ch| allowed.contains(&ch))
}

/// Check if a word has exactly `length` letters
pub fn has_length(word: &str, length: usize) -> bool {
    word.chars().count() == length
}

/// Return the items in random order
pub fn shuffled<T>(mut items: Vec<T>) -> Vec<T> {
    let mut rng = rand::thread_rng();
    items.shuffle(&mut rng);
    items
}

/// Derive the rate limiting identity of a client from forwarding headers
///
/// Takes the first `X-Forwarded-For` entry, then `X-Real-IP`. Both are set by
/// whoever sends the request, so this identity can be spoofed.
pub fn client_identifier(req: &HttpRequest) -> String {
    if let Some(first) = header(req, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }

    header(req, "x-real-ip").unwrap_or(UNKNOWN_CLIENT).to_string()
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
