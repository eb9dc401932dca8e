//! Canonical forms of administrative names for comparison.

/// Administrative-level prefixes, stripped in this order (first match only).
const LEVEL_PREFIXES: &[&str] = &[
    "PROVINSI ",
    "KABUPATEN ",
    "KOTA ",
    "KECAMATAN ",
    "DESA ",
    "KELURAHAN ",
];

/// Names containing this token all collapse to it.
const YOGYAKARTA: &str = "YOGYAKARTA";

/// Normalize a free-text administrative name.
///
/// Upper-cases, collapses whitespace, strips the first matching level prefix
/// and folds every Yogyakarta variant into a single token. The result is only
/// used for comparisons and never shown to callers.
pub fn normalize(raw: &str) -> String {
    let upper = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();

    let stripped = LEVEL_PREFIXES
        .iter()
        .find_map(|prefix| upper.strip_prefix(prefix))
        .map(str::trim)
        .unwrap_or(upper.as_str());

    if stripped.contains(YOGYAKARTA) {
        return YOGYAKARTA.to_string();
    }

    stripped.to_string()
}

/// Normalize an optional raw name; absent names normalize to an empty string.
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}

/// Substring containment in either direction.
pub fn mutually_contains(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize_opt(None), "");
    }

    #[test]
    fn test_case_and_prefix() {
        assert_eq!(normalize("Kabupaten Sleman"), normalize("SLEMAN"));
        assert_eq!(normalize("  kota   Bandung "), "BANDUNG");
        assert_eq!(normalize("Provinsi Jawa Barat"), "JAWA BARAT");
        assert_eq!(normalize("Kecamatan Depok"), "DEPOK");
        assert_eq!(normalize("Kelurahan Menteng"), "MENTENG");
        assert_eq!(normalize("DESA NANGA EMAU"), "NANGA EMAU");
    }

    #[test]
    fn test_strips_only_first_prefix() {
        assert_eq!(normalize("DESA KOTA BARU"), "KOTA BARU");
    }

    #[test]
    fn test_prefix_requires_word_boundary() {
        assert_eq!(normalize("KOTAWARINGIN BARAT"), "KOTAWARINGIN BARAT");
        assert_eq!(normalize("KOTA"), "KOTA");
    }

    #[test]
    fn test_yogyakarta_variants() {
        for raw in [
            "Daerah Istimewa Yogyakarta",
            "DI YOGYAKARTA",
            "Kota Yogyakarta",
            "special region of yogyakarta",
            "yogyakarta",
        ] {
            assert_eq!(normalize(raw), "YOGYAKARTA", "{raw}");
        }
    }

    #[test]
    fn test_idempotent() {
        for raw in [
            "Kabupaten Sleman",
            "KOTA ADM. JAKARTA SELATAN",
            "Desa  Nanga   Emau",
            "Daerah Istimewa Yogyakarta",
            "kalimantan barat",
            "",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "{raw}");
        }
    }

    #[test]
    fn test_mutually_contains() {
        assert!(mutually_contains("JAWA BARAT", "BARAT"));
        assert!(mutually_contains("BARAT", "JAWA BARAT"));
        assert!(!mutually_contains("JAWA TIMUR", "BARAT"));
    }
}
