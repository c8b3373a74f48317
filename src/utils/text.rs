//! Small text helpers shared by the description modules

/// Joins items as an English list: `a`, `a and b`, `a, b and c`.
pub fn format_list<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|s| s.as_ref()).collect();
            format!("{} and {}", head.join(", "), last.as_ref())
        }
    }
}

/// Quotes a mount path so it can be embedded in a sentence.
pub fn formatted_path(path: &str) -> String {
    format!("\"{}\"", path)
}

/// Upper-cases the first character, leaving the rest untouched.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_lists() {
        assert_eq!(format_list::<&str>(&[]), "");
        assert_eq!(format_list(&["/"]), "/");
        assert_eq!(format_list(&["/", "/home"]), "/ and /home");
        assert_eq!(format_list(&["/", "/home", "swap"]), "/, /home and swap");
    }

    #[test]
    fn quotes_paths() {
        assert_eq!(formatted_path("/var"), "\"/var\"");
    }

    #[test]
    fn capitalizes_first_letter() {
        assert_eq!(capitalize("zfs"), "Zfs");
        assert_eq!(capitalize(""), "");
    }
}
