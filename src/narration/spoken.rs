//! Spoken forms for units that a speech engine would otherwise mispronounce.

use crate::content::pinyin::PinyinTable;

/// What a phonics unit sounds like when read alone (`sh` -> `shuh`).
/// Unknown units are spoken as written.
pub fn phonics_sound(unit: &str) -> String {
    let lower = unit.to_lowercase();
    let sound = match lower.as_str() {
        "b" => "buh",
        "c" | "k" | "ck" => "kuh",
        "d" => "duh",
        "f" | "ph" => "fuh",
        "g" => "guh",
        "h" => "huh",
        "j" => "juh",
        "l" => "luh",
        "m" => "muh",
        "n" | "kn" => "nuh",
        "p" => "puh",
        "q" => "kwuh",
        "r" | "wr" => "ruh",
        "s" => "suh",
        "t" => "tuh",
        "v" => "vuh",
        "w" | "wh" => "wuh",
        "x" => "ks",
        "y" => "yuh",
        "z" => "zuh",
        "a" => "aah",
        "e" => "eh",
        "i" => "ih",
        "o" => "ah",
        "u" => "uh",
        "ai" | "ay" => "ey",
        "ee" | "ea" => "ee",
        "oa" | "oe" => "oh",
        "ow" | "ou" => "ow",
        "oo" => "oo",
        "oi" | "oy" => "oy",
        "au" | "aw" => "aw",
        "igh" => "eye",
        "ar" => "ar",
        "er" | "ir" | "ur" => "er",
        "or" => "or",
        "th" => "thuh",
        "sh" => "shuh",
        "ch" => "chuh",
        "ng" => "ng",
        "nk" => "nk",
        "bl" => "bluh",
        "br" => "bruh",
        "cl" => "cluh",
        "cr" => "cruh",
        "dr" => "druh",
        "fl" => "fluh",
        "fr" => "fruh",
        "gl" => "gluh",
        "gr" => "gruh",
        "pl" => "pluh",
        "pr" => "pruh",
        "sc" => "scuh",
        "sk" => "skuh",
        "sl" => "sluh",
        "sm" => "smuh",
        "sn" => "snuh",
        "sp" => "spuh",
        "st" => "stuh",
        "sw" => "swuh",
        "tr" => "truh",
        "tw" => "twuh",
        "nt" => "nt",
        "nd" => "nd",
        "lt" => "lt",
        "ld" => "ld",
        "ft" => "ft",
        _ => return unit.to_string(),
    };
    sound.to_string()
}

/// Teaching character for a pinyin initial (声母), read with its customary vowel.
pub fn initial_character(initial: &str) -> Option<&'static str> {
    let ch = match initial {
        "b" => "波",
        "p" => "泼",
        "m" => "摸",
        "f" => "佛",
        "d" => "得",
        "t" => "特",
        "n" => "讷",
        "l" => "勒",
        "g" => "哥",
        "k" => "科",
        "h" => "喝",
        "j" => "基",
        "q" => "七",
        "x" => "西",
        "zh" => "知",
        "ch" => "吃",
        "sh" => "诗",
        "r" => "日",
        "z" => "资",
        "c" => "次",
        "s" => "思",
        "y" => "衣",
        "w" => "乌",
        _ => return None,
    };
    Some(ch)
}

pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fa5}').contains(&c))
}

/// Text a Chinese voice should read for a pinyin unit: Chinese text as is,
/// an initial as its teaching character, otherwise the first example word of
/// the unit. Units not in the table are read as written.
pub fn pinyin_spoken(unit: &str, table: &PinyinTable) -> String {
    if contains_cjk(unit) {
        return unit.to_string();
    }
    if let Some(ch) = initial_character(unit) {
        return ch.to_string();
    }
    table
        .categories
        .iter()
        .filter_map(|category| category.units.iter().find(|u| u.pinyin == unit))
        .find_map(|u| u.words.first())
        .cloned()
        .unwrap_or_else(|| unit.to_string())
}
