//! Helpers for inline `style` attributes.

/// Split a style attribute into `(property, value)` pairs. Property names are
/// lowercased; malformed declarations are skipped.
pub fn declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim();
            (!property.is_empty() && !value.is_empty()).then(|| (property, value.to_string()))
        })
        .collect()
}

/// Value of the last declaration of `property`, as a browser would apply it.
pub fn property(style: &str, property: &str) -> Option<String> {
    declarations(style)
        .into_iter()
        .rev()
        .find(|(name, _)| name == property)
        .map(|(_, value)| value)
}

/// Lowercase the style text and remove all whitespace, for substring checks
/// that must not depend on how the author spaced the declarations.
pub fn compact(style: &str) -> String {
    style
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_declarations_skip_malformed() {
        assert_eq!(
            declarations("Text-Align: center; broken; color:;margin:0"),
            vec![
                ("text-align".to_string(), "center".to_string()),
                ("margin".to_string(), "0".to_string())
            ]
        );
    }

    #[test]
    fn test_property_last_wins() {
        assert_eq!(
            property("text-align: left; text-align: right", "text-align"),
            Some("right".to_string())
        );
        assert_eq!(property("color: red", "text-align"), None);
    }

    #[test]
    fn test_compact() {
        assert_eq!(
            compact("display: flex;\n Justify-Content : Center"),
            "display:flex;justify-content:center"
        );
    }
}
