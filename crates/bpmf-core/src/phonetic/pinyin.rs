//! Conversions between Hanyu Pinyin syllables and Zhuyin readings.

const INITIALS: &[(&str, char)] = &[
    ("zh", 'ㄓ'),
    ("ch", 'ㄔ'),
    ("sh", 'ㄕ'),
    ("b", 'ㄅ'),
    ("p", 'ㄆ'),
    ("m", 'ㄇ'),
    ("f", 'ㄈ'),
    ("d", 'ㄉ'),
    ("t", 'ㄊ'),
    ("n", 'ㄋ'),
    ("l", 'ㄌ'),
    ("g", 'ㄍ'),
    ("k", 'ㄎ'),
    ("h", 'ㄏ'),
    ("j", 'ㄐ'),
    ("q", 'ㄑ'),
    ("x", 'ㄒ'),
    ("r", 'ㄖ'),
    ("z", 'ㄗ'),
    ("c", 'ㄘ'),
    ("s", 'ㄙ'),
];

/// Finals in their full (uncontracted) spelling; `v` stands for ü.
const FINALS: &[(&str, &str)] = &[
    ("a", "ㄚ"),
    ("o", "ㄛ"),
    ("e", "ㄜ"),
    ("ai", "ㄞ"),
    ("ei", "ㄟ"),
    ("ao", "ㄠ"),
    ("ou", "ㄡ"),
    ("an", "ㄢ"),
    ("en", "ㄣ"),
    ("ang", "ㄤ"),
    ("eng", "ㄥ"),
    ("er", "ㄦ"),
    ("ong", "ㄨㄥ"),
    ("i", "ㄧ"),
    ("ia", "ㄧㄚ"),
    ("io", "ㄧㄛ"),
    ("ie", "ㄧㄝ"),
    ("iao", "ㄧㄠ"),
    ("iou", "ㄧㄡ"),
    ("ian", "ㄧㄢ"),
    ("in", "ㄧㄣ"),
    ("iang", "ㄧㄤ"),
    ("ing", "ㄧㄥ"),
    ("iong", "ㄩㄥ"),
    ("u", "ㄨ"),
    ("ua", "ㄨㄚ"),
    ("uo", "ㄨㄛ"),
    ("uai", "ㄨㄞ"),
    ("uei", "ㄨㄟ"),
    ("uan", "ㄨㄢ"),
    ("uen", "ㄨㄣ"),
    ("uang", "ㄨㄤ"),
    ("ueng", "ㄨㄥ"),
    ("v", "ㄩ"),
    ("ve", "ㄩㄝ"),
    ("van", "ㄩㄢ"),
    ("vn", "ㄩㄣ"),
];

/// Initials whose bare syllable carries the apical vowel (`zhi`, `si`, ...).
const APICAL: &str = "ㄓㄔㄕㄖㄗㄘㄙ";
const PALATAL: &str = "ㄐㄑㄒ";

fn lookup_final(spelling: &str) -> Option<&'static str> {
    FINALS
        .iter()
        .find(|(s, _)| *s == spelling)
        .map(|(_, z)| *z)
}

/// Convert one toneless pinyin syllable to Zhuyin phonabets.
///
/// Returns `None` when the spelling does not parse as initial + final.
pub fn pinyin_to_zhuyin(syllable: &str) -> Option<String> {
    let syllable = syllable.replace('ü', "v");
    if syllable.is_empty() || !syllable.is_ascii() {
        return None;
    }

    // y- and w- spell a bare medial
    if let Some(rest) = syllable.strip_prefix('y') {
        let full = if let Some(r) = rest.strip_prefix('u') {
            format!("v{r}")
        } else if rest.starts_with('i') {
            rest.to_string()
        } else {
            format!("i{rest}")
        };
        return lookup_final(&full).map(str::to_string);
    }
    if let Some(rest) = syllable.strip_prefix('w') {
        let full = if rest.starts_with('u') {
            rest.to_string()
        } else {
            format!("u{rest}")
        };
        return lookup_final(&full).map(str::to_string);
    }

    let (initial, rest) = INITIALS
        .iter()
        .find_map(|(spelling, z)| syllable.strip_prefix(spelling).map(|r| (Some(*z), r)))
        .unwrap_or((None, syllable.as_str()));

    let Some(initial) = initial else {
        return lookup_final(rest).map(str::to_string);
    };

    if rest == "i" && APICAL.contains(initial) {
        return Some(initial.to_string());
    }

    let full = match rest {
        "iu" => "iou".to_string(),
        "ui" => "uei".to_string(),
        "un" if !PALATAL.contains(initial) => "uen".to_string(),
        r if PALATAL.contains(initial) && r.starts_with('u') => format!("v{}", &r[1..]),
        r => r.to_string(),
    };
    if PALATAL.contains(initial) && !(full.starts_with('i') || full.starts_with('v')) {
        return None;
    }
    let fin = lookup_final(&full)?;
    Some(format!("{initial}{fin}"))
}

/// Convert a Zhuyin reading (optionally toned) to numeric-tone pinyin.
///
/// Readings that do not parse are returned unchanged.
pub fn zhuyin_to_pinyin(reading: &str) -> String {
    let mut initial = None;
    let mut medial_final = String::new();
    let mut tone = '1';
    for c in reading.chars() {
        if let Some((spelling, _)) = INITIALS.iter().find(|(_, z)| *z == c) {
            initial = Some((*spelling, c));
        } else {
            match c {
                'ˊ' => tone = '2',
                'ˇ' => tone = '3',
                'ˋ' => tone = '4',
                '˙' => tone = '5',
                ' ' => tone = '1',
                _ => medial_final.push(c),
            }
        }
    }

    let Some(spelling) = FINALS
        .iter()
        .find(|(_, z)| *z == medial_final)
        .map(|(s, _)| *s)
        .or(if medial_final.is_empty() { Some("") } else { None })
    else {
        return reading.to_string();
    };

    let body = match initial {
        None => match spelling {
            "" => return reading.to_string(),
            "i" => "yi".to_string(),
            "u" => "wu".to_string(),
            "v" => "yu".to_string(),
            s if s.starts_with('v') => format!("yu{}", &s[1..]),
            "iou" => "you".to_string(),
            "uei" => "wei".to_string(),
            "uen" => "wen".to_string(),
            "ong" => "weng".to_string(),
            s if s.starts_with('i') && s.len() > 1 => {
                let tail = &s[1..];
                if tail.starts_with('n') {
                    format!("yi{tail}")
                } else {
                    format!("y{tail}")
                }
            }
            s if s.starts_with('u') && s.len() > 1 => format!("w{}", &s[1..]),
            s => s.to_string(),
        },
        Some((init, z)) => {
            let fin = match spelling {
                "" if APICAL.contains(z) => "i".to_string(),
                "" => String::new(),
                "iou" => "iu".to_string(),
                "uei" => "ui".to_string(),
                "uen" => "un".to_string(),
                s if s.starts_with('v') && PALATAL.contains(z) => format!("u{}", &s[1..]),
                s => s.to_string(),
            };
            format!("{init}{fin}")
        }
    };
    format!("{body}{tone}")
}

/// Move the neutral-tone mark to the front of each syllable, as printed
/// in textbooks (`ㄉㄜ˙` becomes `˙ㄉㄜ`).
pub fn to_textbook_reading(reading: &str) -> String {
    reading
        .split('-')
        .map(|syllable| match syllable.strip_suffix('˙') {
            Some(body) => format!("˙{body}"),
            None => syllable.to_string(),
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_syllables() {
        assert_eq!(pinyin_to_zhuyin("ni").as_deref(), Some("ㄋㄧ"));
        assert_eq!(pinyin_to_zhuyin("hao").as_deref(), Some("ㄏㄠ"));
        assert_eq!(pinyin_to_zhuyin("zhong").as_deref(), Some("ㄓㄨㄥ"));
        assert_eq!(pinyin_to_zhuyin("shi").as_deref(), Some("ㄕ"));
        assert_eq!(pinyin_to_zhuyin("er").as_deref(), Some("ㄦ"));
    }

    #[test]
    fn contracted_finals() {
        assert_eq!(pinyin_to_zhuyin("liu").as_deref(), Some("ㄌㄧㄡ"));
        assert_eq!(pinyin_to_zhuyin("gui").as_deref(), Some("ㄍㄨㄟ"));
        assert_eq!(pinyin_to_zhuyin("lun").as_deref(), Some("ㄌㄨㄣ"));
    }

    #[test]
    fn palatal_u_is_umlaut() {
        assert_eq!(pinyin_to_zhuyin("ju").as_deref(), Some("ㄐㄩ"));
        assert_eq!(pinyin_to_zhuyin("xue").as_deref(), Some("ㄒㄩㄝ"));
        assert_eq!(pinyin_to_zhuyin("qun").as_deref(), Some("ㄑㄩㄣ"));
        assert_eq!(pinyin_to_zhuyin("ja"), None);
    }

    #[test]
    fn y_and_w_spellings() {
        assert_eq!(pinyin_to_zhuyin("yi").as_deref(), Some("ㄧ"));
        assert_eq!(pinyin_to_zhuyin("you").as_deref(), Some("ㄧㄡ"));
        assert_eq!(pinyin_to_zhuyin("yong").as_deref(), Some("ㄩㄥ"));
        assert_eq!(pinyin_to_zhuyin("yue").as_deref(), Some("ㄩㄝ"));
        assert_eq!(pinyin_to_zhuyin("wo").as_deref(), Some("ㄨㄛ"));
        assert_eq!(pinyin_to_zhuyin("wei").as_deref(), Some("ㄨㄟ"));
    }

    #[test]
    fn lv_with_umlaut() {
        assert_eq!(pinyin_to_zhuyin("lv").as_deref(), Some("ㄌㄩ"));
        assert_eq!(pinyin_to_zhuyin("lü").as_deref(), Some("ㄌㄩ"));
    }

    #[test]
    fn garbage_rejected() {
        assert_eq!(pinyin_to_zhuyin("qqq"), None);
        assert_eq!(pinyin_to_zhuyin(""), None);
    }

    #[test]
    fn zhuyin_back_to_pinyin() {
        assert_eq!(zhuyin_to_pinyin("ㄋㄧˇ"), "ni3");
        assert_eq!(zhuyin_to_pinyin("ㄏㄠˇ"), "hao3");
        assert_eq!(zhuyin_to_pinyin("ㄕ"), "shi1");
        assert_eq!(zhuyin_to_pinyin("ㄌㄧㄡˊ"), "liu2");
        assert_eq!(zhuyin_to_pinyin("ㄐㄩ"), "ju1");
        assert_eq!(zhuyin_to_pinyin("ㄌㄩ"), "lv1");
        assert_eq!(zhuyin_to_pinyin("ㄧㄡˇ"), "you3");
        assert_eq!(zhuyin_to_pinyin("ㄧㄣ"), "yin1");
        assert_eq!(zhuyin_to_pinyin("ㄨㄛˇ"), "wo3");
        assert_eq!(zhuyin_to_pinyin("ㄉㄜ˙"), "de5");
    }

    #[test]
    fn textbook_neutral_tone() {
        assert_eq!(to_textbook_reading("ㄉㄜ˙"), "˙ㄉㄜ");
        assert_eq!(to_textbook_reading("ㄋㄧˇ-ㄇㄣ˙"), "ㄋㄧˇ-˙ㄇㄣ");
        assert_eq!(to_textbook_reading("ㄋㄧˇ"), "ㄋㄧˇ");
    }
}
