//! Label formatting helpers shared by the summary and output layers

/// Uppercase the first character, leaving the rest untouched.
///
/// `capitalize("name")` is `"Name"`; the empty string stays empty.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turn a camelCase attribute key into a spaced, capitalized label
///
/// `workflowTypeName` becomes `Workflow Type Name`. Every uppercase
/// character starts a new word, so `runID` becomes `Run I D`.
pub fn format_camel_case(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            spaced.push(' ');
        }
        spaced.push(c);
    }
    capitalize(&spaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("name"), "Name");
        assert_eq!(capitalize("Name"), "Name");
        assert_eq!(capitalize("n"), "N");
        assert_eq!(capitalize("workflowId"), "WorkflowId");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_capitalize_non_ascii() {
        assert_eq!(capitalize("élan"), "Élan");
    }

    #[test]
    fn test_format_camel_case() {
        assert_eq!(format_camel_case("workflowTypeName"), "Workflow Type Name");
        assert_eq!(format_camel_case("ActivityTypeName"), "Activity Type Name");
        assert_eq!(format_camel_case("attempt"), "Attempt");
        assert_eq!(format_camel_case("runID"), "Run I D");
        assert_eq!(format_camel_case(""), "");
    }
}
