//! Fixed category set.
//!
//! Hardcoded, ordered, read-only at runtime. Used for input validation and
//! for UI category pickers.

pub const CATEGORIES: [&str; 15] = [
    "Almacenamiento",
    "Audio",
    "Cámaras",
    "Componentes",
    "Energía",
    "Gaming",
    "Impresoras",
    "Laptops",
    "Mobiliario",
    "Monitores",
    "Periféricos",
    "Redes",
    "Smartphones",
    "Software",
    "Tablets",
];

pub fn is_valid_category(name: &str) -> bool {
    CATEGORIES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_category_is_valid() {
        assert!(is_valid_category("Laptops"));
        assert!(is_valid_category("Cámaras"));
    }

    #[test]
    fn unknown_or_differently_cased_category_is_invalid() {
        assert!(!is_valid_category("laptops"));
        assert!(!is_valid_category("Drones"));
        assert!(!is_valid_category(""));
    }
}
