//! Name folding shared by the shopping and nutrition engines.
//!
//! Lookups go through [`fold_name`]; results are still reported under the
//! spelling the user wrote. Keep the two steps separate.

/// Case-folds an ingredient or inventory name for lookup.
///
/// Only case is normalized. Whitespace and punctuation are significant.
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_only() {
        assert_eq!(fold_name("Egg"), "egg");
        assert_eq!(fold_name("OLIVE Oil"), "olive oil");
        assert_eq!(fold_name(" egg "), " egg ");
    }

    #[test]
    fn folds_non_ascii() {
        assert_eq!(fold_name("CRÈME FRAÎCHE"), "crème fraîche");
    }
}
