/// # City and airport names
///
/// Airport fields in pasted itineraries come in many shapes: the full Arabic airport name,
/// the English one, an IATA code, or a plain English city name. All of them are folded to the
/// canonical Arabic city label used on movement records.
///
/// Lookup is substring based and ordered: the first key contained in the raw value wins.
/// Values that contain no key are returned trimmed.
///
/// ## Example:
///
/// `
/// مطار الملك عبدالعزيز الدولي - صالة 1   -> جدة
/// Prince Mohammed bin Abdulaziz (MED)    -> المدينة المنورة
/// مكة المكرمة                            -> مكة المكرمة
/// `
pub const JEDDAH: &str = "جدة";
pub const MADINAH: &str = "المدينة المنورة";
pub const MAKKAH: &str = "مكة المكرمة";
pub const TAIF: &str = "الطائف";
pub const CAIRO: &str = "القاهرة";

const CITY_TABLE: &[(&str, &str)] = &[
    ("مطار الملك عبد العزيز", JEDDAH),
    ("مطار الملك عبدالعزيز", JEDDAH),
    ("King Abdulaziz", JEDDAH),
    ("JED", JEDDAH),
    ("مطار الأمير محمد", MADINAH),
    ("مطار الامير محمد", MADINAH),
    ("Prince Mohammed", MADINAH),
    ("MED", MADINAH),
    ("مطار الطائف", TAIF),
    ("TIF", TAIF),
    ("مطار القاهرة", CAIRO),
    ("CAI", CAIRO),
    ("Jeddah", JEDDAH),
    ("Jiddah", JEDDAH),
    ("Madinah", MADINAH),
    ("Medina", MADINAH),
    ("Makkah", MAKKAH),
    ("Mecca", MAKKAH),
    ("Taif", TAIF),
    ("Cairo", CAIRO),
];

/// Maps a raw airport or city field to its canonical city label.
pub fn normalize_city(raw: &str) -> String {
    let raw = raw.trim();
    CITY_TABLE
        .iter()
        .find(|(key, _)| raw.contains(key))
        .map(|(_, city)| city.to_string())
        .unwrap_or_else(|| raw.to_string())
}
