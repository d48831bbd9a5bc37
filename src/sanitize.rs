//! Identifier sanitizing.

use unicode_properties::{GeneralCategory, GeneralCategoryGroup, UnicodeGeneralCategory};

/// Replace every character that is not a Unicode letter or decimal digit
/// with `_`.
///
/// The character count is preserved and consecutive replacements are not
/// collapsed, so `"Living Room"` becomes `"Living_Room"` and `"a--b"`
/// becomes `"a__b"`. Applying it twice yields the same string.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if is_letter_or_digit(c) { c } else { '_' })
        .collect()
}

/// Letters (general category `L*`) and decimal digits (`Nd`). Other numbers
/// such as `²`, `½` or `Ⅻ` are not digits.
fn is_letter_or_digit(c: char) -> bool {
    matches!(c.general_category_group(), GeneralCategoryGroup::Letter)
        || matches!(c.general_category(), GeneralCategory::DecimalNumber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_whitespace_and_punctuation() {
        assert_eq!(sanitize("Living Room"), "Living_Room");
        assert_eq!(sanitize("Power Draw (W)"), "Power_Draw__W_");
        assert_eq!(sanitize("a-b.c/d"), "a_b_c_d");
    }

    #[test]
    fn test_keeps_letters_digits_and_case() {
        assert_eq!(sanitize("Sensor42"), "Sensor42");
        assert_eq!(sanitize("ABCxyz"), "ABCxyz");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_unicode_letters_are_kept() {
        assert_eq!(sanitize("Küche Temp"), "Küche_Temp");
        assert_eq!(sanitize("温度 1"), "温度_1");
        assert_eq!(sanitize("20°C"), "20_C");
    }

    #[test]
    fn test_only_decimal_numbers_count_as_digits() {
        assert_eq!(sanitize("CO₂"), "CO_");
        assert_eq!(sanitize("m²"), "m_");
        assert_eq!(sanitize("½ load"), "__load");
        assert_eq!(sanitize("Ⅻ"), "_");
        assert_eq!(sanitize("٣"), "٣");
        assert_eq!(sanitize("Zone ٣"), "Zone_٣");
    }

    #[test]
    fn test_preserves_character_count() {
        for input in ["Living Room", "Küche/Bad", "  ", "x!y?z", "ÄÖÜ äöü", "🌡 temp", "CO₂ m²"] {
            let out = sanitize(input);
            assert_eq!(out.chars().count(), input.chars().count(), "input {input:?}");
            for (original, replaced) in input.chars().zip(out.chars()) {
                if is_letter_or_digit(original) {
                    assert_eq!(original, replaced);
                } else {
                    assert_eq!(replaced, '_');
                }
            }
        }
    }

    #[test]
    fn test_idempotent() {
        for input in ["Living Room", "a--b", "Küche/Bad", "__", "ok", "CO₂"] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once);
        }
    }
}
