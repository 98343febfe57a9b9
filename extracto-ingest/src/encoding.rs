//! Character-encoding repair for statement text.
//!
//! Bank exports regularly arrive double-decoded (UTF-8 read as Latin-1/Windows-1252)
//! or with accented letters already lost to U+FFFD. Both are fixed from fixed tables.

use regex::{Captures, Regex, RegexBuilder};
use std::borrow::Cow;
use std::sync::LazyLock;

/// UTF-8 sequences as they read after a Windows-1252 (or Latin-1) decode
const MOJIBAKE: &[(&str, &str)] = &[
    ("â‚¬", "€"),
    ("Ã¡", "á"),
    ("Ã©", "é"),
    ("Ã\u{ad}", "í"),
    ("Ã³", "ó"),
    ("Ãº", "ú"),
    ("Ã±", "ñ"),
    ("Ã¼", "ü"),
    ("Ã\u{81}", "Á"),
    ("Ã‰", "É"),
    ("Ã\u{8d}", "Í"),
    ("Ã“", "Ó"),
    ("Ãš", "Ú"),
    ("Ã‘", "Ñ"),
    ("Ãœ", "Ü"),
    ("Âº", "º"),
    ("Âª", "ª"),
];

/// Words whose accented letter was replaced by U+FFFD, with their ASCII spelling
const LOST_ACCENTS: &[(&str, &str)] = &[
    ("n\u{fffd}mina", "nomina"),
    ("cotizaci\u{fffd}n", "cotizacion"),
    ("suscripci\u{fffd}n", "suscripcion"),
    ("comisi\u{fffd}n", "comision"),
    ("tel\u{fffd}fono", "telefono"),
    ("aut\u{fffd}nomo", "autonomo"),
    ("asesor\u{fffd}a", "asesoria"),
    ("mercader\u{fffd}a", "mercaderia"),
    ("miscel\u{fffd}neo", "miscelaneo"),
    ("descripci\u{fffd}n", "descripcion"),
    ("operaci\u{fffd}n", "operacion"),
    ("liquidaci\u{fffd}n", "liquidacion"),
    ("devoluci\u{fffd}n", "devolucion"),
    ("informaci\u{fffd}n", "informacion"),
    ("cr\u{fffd}dito", "credito"),
    ("d\u{fffd}bito", "debito"),
    ("compa\u{fffd}ia", "compania"),
    ("compa\u{fffd}\u{fffd}a", "compania"),
    ("espa\u{fffd}a", "espana"),
    ("se\u{fffd}al", "senal"),
];

static LOST_ACCENT_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    LOST_ACCENTS
        .iter()
        .map(|(broken, fixed)| {
            let re = RegexBuilder::new(&regex::escape(broken))
                .case_insensitive(true)
                .build()
                .expect("escaped literal must compile");
            (re, *fixed)
        })
        .collect()
});

/// Windows-1252 code points for bytes 0x80..=0x9F (undefined slots map to the C1 control)
const CP1252_HIGH: [char; 32] = [
    '€', '\u{81}', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\u{8d}', 'Ž',
    '\u{8f}', '\u{90}', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ', '\u{9d}',
    'ž', 'Ÿ',
];

/// Repair known corrupted sequences. Idempotent: the result contains none of them.
pub fn repair(text: &str) -> String {
    let mut current = text.to_string();
    // A fix can expose another (e.g. "ÃÂº" -> "Ãº" -> "ú"), so run to a fixpoint.
    // Every replacement removes a corrupted marker, so this terminates.
    loop {
        let next = repair_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn repair_once(text: &str) -> String {
    let mut out = text.to_string();
    for (broken, fixed) in MOJIBAKE {
        if out.contains(broken) {
            out = out.replace(broken, fixed);
        }
    }
    if out.contains('\u{fffd}') {
        for (re, fixed) in LOST_ACCENT_RULES.iter() {
            out = re
                .replace_all(&out, |caps: &Captures| match_case(&caps[0], fixed))
                .into_owned();
        }
    }
    out
}

/// Give `replacement` the case shape of `found`: all caps, capitalized or lowercase.
fn match_case(found: &str, replacement: &str) -> String {
    let mut letters = found.chars().filter(|c| c.is_alphabetic()).peekable();
    if letters.peek().is_some() && letters.all(char::is_uppercase) {
        return replacement.to_uppercase();
    }
    if found.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = replacement.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    replacement.to_string()
}

/// Best-effort decode of raw file bytes: UTF-8 when valid, Windows-1252 otherwise.
pub fn decode_bytes(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(e) => {
            tracing::warn!(
                "input is not valid UTF-8 (at byte {}), decoding as Windows-1252",
                e.valid_up_to()
            );
            Cow::Owned(
                bytes
                    .iter()
                    .map(|&b| match b {
                        0x80..=0x9f => CP1252_HIGH[(b - 0x80) as usize],
                        _ => char::from(b),
                    })
                    .collect(),
            )
        }
    }
}
