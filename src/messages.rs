//! User-facing wording shared by every transport.

/// Uppercases the first character and lowercases the rest.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn caught_message(name: &str) -> String {
    format!("Gotcha! You caught {}.", capitalize(name))
}

pub fn fled_message(name: &str) -> String {
    format!("{} broke free!", capitalize(name))
}

pub fn released_message(name: &str) -> String {
    format!("{} was released back into the wild.", capitalize(name))
}

pub fn limit_reached_message(limit: usize) -> String {
    format!(
        "You already have {} Pokémon! Release some before catching more.",
        limit
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_names() {
        assert_eq!(capitalize("pikachu"), "Pikachu");
        assert_eq!(capitalize("MR-MIME"), "Mr-mime");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn formats_outcomes() {
        assert_eq!(caught_message("pikachu"), "Gotcha! You caught Pikachu.");
        assert_eq!(fled_message("pikachu"), "Pikachu broke free!");
        assert_eq!(
            released_message("pikachu"),
            "Pikachu was released back into the wild."
        );
        assert!(limit_reached_message(10).contains("10 Pokémon"));
    }
}
