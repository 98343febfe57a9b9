//! Text normalization shared by header detection and the classifier

/// Lowercase and strip Spanish diacritics so `NÓMINA` and `nomina` compare equal.
pub fn fold(text: &str) -> String {
    strip_accents(&text.to_lowercase())
}

/// Replace accented letters with their base letter, keeping case.
///
/// Unlike [`fold`] this leaves ASCII untouched, so it is safe on regex sources
/// (`\S` stays `\S`).
pub fn strip_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            'Á' | 'À' | 'Â' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'Ñ' => 'N',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}
