use rand::Rng;

const FALLBACK_STEM: &str = "USER";
const MAX_NAME_PARTS: usize = 3;

/// Login handle from a full name: `"Иванов Пётр Сергеевич"` becomes `IVANOVPETRSERGEEVICH` plus
/// a random three-digit suffix.
pub(crate) fn derive_username(full_name: &str) -> String {
    let suffix = rand::thread_rng().gen_range(100..=999);
    format!("{}{suffix}", username_stem(full_name))
}

pub(crate) fn username_stem(full_name: &str) -> String {
    let stem = full_name
        .split_whitespace()
        .map(latin_part)
        .filter(|part| !part.is_empty())
        .take(MAX_NAME_PARTS)
        .collect::<String>()
        .to_uppercase();

    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    }
}

fn latin_part(part: &str) -> String {
    let mut output = String::with_capacity(part.len());
    for ch in part.chars() {
        if ch.is_ascii_alphanumeric() {
            output.push(ch);
        } else if let Some(latin) = transliterate(ch) {
            output.push_str(latin);
        }
    }
    output
}

fn transliterate(ch: char) -> Option<&'static str> {
    let latin = match ch.to_lowercase().next()? {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' | 'й' | 'і' => "i",
        'ї' => "yi",
        'є' => "ye",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ы' => "y",
        'ю' => "yu",
        'я' => "ya",
        'ъ' | 'ь' => "",
        _ => return None,
    };
    Some(latin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_names_are_uppercased_and_joined() {
        assert_eq!(username_stem("Jane Doe"), "JANEDOE");
        assert_eq!(username_stem("  mary   ann   lee  "), "MARYANNLEE");
    }

    #[test]
    fn only_first_three_parts_are_used() {
        assert_eq!(username_stem("Ana Maria Lopez Garcia"), "ANAMARIALOPEZ");
    }

    #[test]
    fn cyrillic_is_transliterated() {
        assert_eq!(username_stem("Иванов Пётр Сергеевич"), "IVANOVPETRSERGEEVICH");
        assert_eq!(username_stem("Щукин Юрий"), "SHCHUKINYURII");
    }

    #[test]
    fn punctuation_is_dropped_and_empty_parts_skipped() {
        assert_eq!(username_stem("O'Neil - Smith-Jones"), "ONEILSMITHJONES");
    }

    #[test]
    fn falls_back_when_nothing_usable_remains() {
        assert_eq!(username_stem(""), "USER");
        assert_eq!(username_stem("李 小龍"), "USER");
    }

    #[test]
    fn suffix_is_three_digits() {
        for _ in 0..50 {
            let username = derive_username("Jane Doe");
            let suffix = username.strip_prefix("JANEDOE").expect("stem");
            let value: u32 = suffix.parse().expect("numeric suffix");
            assert!((100..=999).contains(&value));
        }
    }
}
