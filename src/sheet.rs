// ------------------------------------------------------------------------------------------------
// --- Spreadsheet import / export
// ------------------------------------------------------------------------------------------------
//
// Sheets exported by other tools name their columns in Arabic or English, with varying
// spelling. Each record field is looked up through an ordered alias list: the first alias
// present in the header row wins, matched exactly first and then ignoring case and
// surrounding whitespace.

use std::{
    io::{Read, Write},
    str::FromStr,
};

use chrono::{Days, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::{TResult, TafweejError},
    ids::IdGenerator,
    models::{DateFormat, GroupInfo, Movement, MovementKind, MovementRecord, VehicleClass},
    parsing::{DATE_TOKEN, fold_digits, normalize_date, passenger_count, vehicle_class},
};

pub const GROUP_NO_ALIASES: &[&str] = &["رقم مجموعة", "رقم م", "Group No", "ID"];
pub const GROUP_NAME_ALIASES: &[&str] = &["اسم المجموعة", "Name", "Group Name"];
pub const COUNT_ALIASES: &[&str] = &["العدد", "عدد", "Count"];
pub const KIND_ALIASES: &[&str] = &["الحركة", "نوع الحركة", "Movement", "Column1", "الحركة من"];
pub const DATE_ALIASES: &[&str] = &["تاريخ", "التاريخ", "Date"];
pub const TIME_ALIASES: &[&str] = &["وقت الرحلة", "وقت", "وقت الوصول", "Time"];
pub const FLIGHT_ALIASES: &[&str] = &["رقم الرحلة", "رحلة", "Flight", "Flight No"];
pub const FROM_ALIASES: &[&str] = &["من", "From", "Starting Point", "التحرك من"];
pub const TO_ALIASES: &[&str] = &["إلى", "الى", "To", "Destination", "التحرك الى"];
pub const VEHICLE_ALIASES: &[&str] = &["نوع السيارة", "السيارة", "Car Type"];
pub const LABEL_ALIASES: &[&str] = &["تفويج", "التفويج", "tafweej"];

/// Day zero of spreadsheet serial dates.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

lazy_static! {
    static ref DATE_REGEX: Regex = Regex::new(DATE_TOKEN).unwrap();
    // Five integer digits span 1927-05-18 to 2173-10-14. Shorter numbers are years or counts.
    static ref SERIAL_REGEX: Regex = Regex::new(r"^[0-9]{5}(\.[0-9]+)?$").unwrap();
    static ref CLOCK_REGEX: Regex = Regex::new(r"([0-9]{1,2}):([0-9]{2})").unwrap();
    static ref LEADING_CLOCK_REGEX: Regex = Regex::new(r"^[0-9]{1,2}:[0-9]{2}").unwrap();
}

// ------------------------------------------------------------------------------------------------
// --- RawRow
// ------------------------------------------------------------------------------------------------

/// One sheet row as `(header, cell)` pairs, in column order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(header, cell)| (header.to_string(), cell.to_string()))
                .collect(),
        )
    }

    /// Cell of the first alias present in the row.
    pub fn get(&self, aliases: &[&str]) -> Option<&str> {
        let folded = self
            .cells
            .iter()
            .enumerate()
            .fold(FxHashMap::default(), |mut acc, (i, (header, _))| {
                acc.entry(fold_header(header)).or_insert(i);
                acc
            });

        aliases.iter().find_map(|alias| {
            self.cells
                .iter()
                .position(|(header, _)| header == alias)
                .or_else(|| folded.get(&fold_header(alias)).copied())
                .map(|i| self.cells[i].1.as_str())
        })
    }

    fn text(&self, aliases: &[&str]) -> String {
        self.get(aliases).unwrap_or_default().trim().to_string()
    }
}

fn fold_header(header: &str) -> String {
    header.trim().trim_start_matches('\u{feff}').trim().to_lowercase()
}

// ------------------------------------------------------------------------------------------------
// --- Cell normalization
// ------------------------------------------------------------------------------------------------

/// Normalizes a date cell: spreadsheet serial numbers and any accepted date layout are
/// rendered in `format`, anything else (`NaN`, a bare year, free text) is kept.
pub fn sheet_date(cell: &str, format: DateFormat) -> String {
    let cell = fold_digits(cell.trim());
    if cell.is_empty() {
        return String::new();
    }

    if let Some(serial) = SERIAL_REGEX
        .is_match(&cell)
        .then(|| cell.parse::<f64>().ok())
        .flatten()
    {
        let date = NaiveDate::from_ymd_opt(SERIAL_EPOCH.0, SERIAL_EPOCH.1, SERIAL_EPOCH.2)
            .zip(u64::try_from(serial.round() as i64).ok())
            .and_then(|(epoch, days)| epoch.checked_add_days(Days::new(days)));
        if let Some(date) = date {
            return date.format(format.pattern()).to_string();
        }
    }

    match DATE_REGEX.find(&cell) {
        Some(token) => normalize_date(token.as_str(), format),
        None => cell.to_string(),
    }
}

/// Normalizes a time cell to `HH:MM`, honouring Arabic (ص / م) and English (am / pm) markers.
pub fn sheet_time(cell: &str) -> String {
    let cell = fold_digits(cell.trim());
    if cell.is_empty() {
        return String::new();
    }

    let lower = cell.to_lowercase();
    let is_pm = cell.contains('م') || lower.contains("pm");
    let is_am = cell.contains('ص') || lower.contains("am");
    if is_am || is_pm {
        if let Some(captures) = CLOCK_REGEX.captures(&cell) {
            let mut hours = captures[1].parse::<u32>().unwrap_or_default();
            if is_pm && hours < 12 {
                hours += 12;
            }
            if is_am && hours == 12 {
                hours = 0;
            }
            return format!("{hours:02}:{}", &captures[2]);
        }
    }

    match LEADING_CLOCK_REGEX.find(&cell) {
        Some(clock) => format!("{:0>5}", clock.as_str()),
        None => cell.to_string(),
    }
}

// ------------------------------------------------------------------------------------------------
// --- Import
// ------------------------------------------------------------------------------------------------

/// Builds a record from a sheet row. Rows without any group, place, flight or date
/// information are skipped.
pub fn normalize_row(
    row: &RawRow,
    ids: &dyn IdGenerator,
    date_format: DateFormat,
) -> Option<MovementRecord> {
    let count = match row.text(COUNT_ALIASES) {
        count if count.is_empty() => "0".to_string(),
        count => count,
    };
    let group = GroupInfo::new(
        &row.text(GROUP_NO_ALIASES),
        &row.text(GROUP_NAME_ALIASES),
        &count,
    );
    let movement = Movement {
        kind: MovementKind::from(row.text(KIND_ALIASES)),
        date: sheet_date(row.get(DATE_ALIASES).unwrap_or_default(), date_format),
        time: sheet_time(row.get(TIME_ALIASES).unwrap_or_default()),
        flight: row.text(FLIGHT_ALIASES),
        from: row.text(FROM_ALIASES),
        to: row.text(TO_ALIASES),
    };

    if [
        group.group_no(),
        group.group_name(),
        movement.from.as_str(),
        movement.to.as_str(),
        movement.flight.as_str(),
        movement.date.as_str(),
    ]
    .iter()
    .all(|value| value.is_empty())
    {
        return None;
    }

    let vehicle = row.text(VEHICLE_ALIASES);
    let class = VehicleClass::from_str(&vehicle)
        .ok()
        .or_else(|| vehicle_class(group.count()));

    let mut record = MovementRecord::new(ids.next(), &group, movement, class);
    let label = row.text(LABEL_ALIASES);
    if !label.is_empty() {
        record.set_label(label);
    }
    Some(record)
}

/// Reads a header row and data rows, returning the rows that carry any information.
pub fn import_csv<R: Read>(
    reader: R,
    ids: &dyn IdGenerator,
    date_format: DateFormat,
) -> TResult<Vec<MovementRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader
        .headers()?
        .iter()
        .map(String::from)
        .collect::<Vec<_>>();

    let rows = reader
        .records()
        .map(|record| {
            record.map(|record| {
                RawRow::new(
                    headers
                        .iter()
                        .cloned()
                        .zip(record.iter().map(String::from))
                        .collect(),
                )
            })
        })
        .collect::<Result<Vec<_>, csv::Error>>()?;

    if rows.is_empty() {
        return Err(TafweejError::EmptySheet);
    }

    let total = rows.len();
    let records = rows
        .iter()
        .filter_map(|row| normalize_row(row, ids, date_format))
        .collect::<Vec<_>>();
    if records.len() < total {
        log::warn!("Skipped {} empty row(s).", total - records.len());
    }
    log::info!("Imported {} row(s).", records.len());
    Ok(records)
}

// ------------------------------------------------------------------------------------------------
// --- Export
// ------------------------------------------------------------------------------------------------

/// A record laid out in the export column order.
#[derive(Debug, Serialize)]
pub struct ExportRow {
    #[serde(rename = "الحالة")]
    status: String,
    #[serde(rename = "الحركة")]
    kind: String,
    #[serde(rename = "تفويج")]
    label: String,
    #[serde(rename = "نوع السيارة")]
    vehicle_class: String,
    #[serde(rename = "إلى")]
    to: String,
    #[serde(rename = "من")]
    from: String,
    #[serde(rename = "وقت الرحلة")]
    time: String,
    #[serde(rename = "رقم الرحلة")]
    flight: String,
    #[serde(rename = "العدد")]
    count: i64,
    #[serde(rename = "اسم المجموعة")]
    group_name: String,
    #[serde(rename = "رقم مجموعة")]
    group_no: String,
    #[serde(rename = "تاريخ")]
    date: String,
}

impl From<&MovementRecord> for ExportRow {
    fn from(record: &MovementRecord) -> Self {
        Self {
            status: record.status().label_ar().to_string(),
            kind: record.kind().to_string(),
            label: record.label().to_string(),
            vehicle_class: record
                .vehicle_class()
                .map(|v| v.to_string())
                .unwrap_or_default(),
            to: record.to().to_string(),
            from: record.from().to_string(),
            time: record.time().to_string(),
            flight: record.flight().to_string(),
            count: passenger_count(record.count()).unwrap_or(0),
            group_name: record.group_name().to_string(),
            group_no: record.group_no().to_string(),
            date: record.date().to_string(),
        }
    }
}

pub fn export_csv<W: Write>(writer: W, records: &[MovementRecord]) -> TResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(ExportRow::from(record))?;
    }
    writer.flush()?;
    log::info!("Exported {} row(s).", records.len());
    Ok(())
}

// ------------------------------------------------------------------------------------------------
// --- Backup
// ------------------------------------------------------------------------------------------------

/// Full JSON backup of the working list and the recycle bin.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    #[serde(default = "Backup::current_version")]
    version: u32,
    #[serde(default)]
    all_rows: Vec<MovementRecord>,
    #[serde(default)]
    deleted_rows: Vec<MovementRecord>,
}

impl Backup {
    pub const VERSION: u32 = 1;

    fn current_version() -> u32 {
        Self::VERSION
    }

    pub fn new(all_rows: Vec<MovementRecord>, deleted_rows: Vec<MovementRecord>) -> Self {
        Self {
            version: Self::VERSION,
            all_rows,
            deleted_rows,
        }
    }

    // Getters/Setters

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn all_rows(&self) -> &[MovementRecord] {
        &self.all_rows
    }

    pub fn deleted_rows(&self) -> &[MovementRecord] {
        &self.deleted_rows
    }

    // Functions

    /// Loads a backup. Rows saved without an id get a fresh one.
    pub fn read<R: Read>(reader: R, ids: &dyn IdGenerator) -> TResult<Self> {
        let mut backup: Backup = serde_json::from_reader(reader)?;
        if backup.version != Self::VERSION {
            return Err(TafweejError::UnsupportedBackupVersion(backup.version));
        }

        backup
            .all_rows
            .iter_mut()
            .chain(backup.deleted_rows.iter_mut())
            .filter(|record| record.id().is_empty())
            .for_each(|record| record.set_id(ids.next()));

        log::info!(
            "Loaded backup with {} row(s) and {} deleted row(s).",
            backup.all_rows.len(),
            backup.deleted_rows.len()
        );
        Ok(backup)
    }

    pub fn write<W: Write>(&self, writer: W) -> TResult<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ids::SequentialIdGenerator,
        models::{RecordField, TripStatus},
    };
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn alias_lookup() {
        let row = RawRow::from_pairs(&[(" group no ", "G-7"), ("ID", "99"), ("من", "جدة")]);
        // "Group No" comes before "ID" in the alias list, matched case-insensitively.
        assert_eq!(Some("G-7"), row.get(GROUP_NO_ALIASES));
        assert_eq!(Some("جدة"), row.get(FROM_ALIASES));
        assert_eq!(None, row.get(TO_ALIASES));
    }

    #[test]
    fn exact_alias_wins_even_when_empty() {
        let row = RawRow::from_pairs(&[("رقم مجموعة", ""), ("ID", "99")]);
        assert_eq!(Some(""), row.get(GROUP_NO_ALIASES));
    }

    #[test]
    fn dates() {
        let iso = DateFormat::Iso;
        assert_eq!("2025-12-19", sheet_date("46010", iso));
        assert_eq!("2025-12-19", sheet_date("2025-12-19 00:00:00", iso));
        assert_eq!("2025-12-19", sheet_date("19/12/2025", iso));
        assert_eq!("19/12/2025", sheet_date("2025-12-19", DateFormat::DayFirst));
        assert_eq!("بعد العيد", sheet_date("بعد العيد", iso));
        assert_eq!("", sheet_date("  ", iso));
    }

    #[test]
    fn only_serial_shaped_numbers_are_dates() {
        let iso = DateFormat::Iso;
        assert_eq!("2025-12-19", sheet_date("46010.0", iso));
        assert_eq!("NaN", sheet_date("NaN", iso));
        assert_eq!("inf", sheet_date("inf", iso));
        assert_eq!("2025", sheet_date("2025", iso));
        assert_eq!("-46010", sheet_date("-46010", iso));
    }

    #[test]
    fn times() {
        assert_eq!("07:30", sheet_time("07:30:00 ص"));
        assert_eq!("19:30", sheet_time("07:30:00 م"));
        assert_eq!("00:15", sheet_time("12:15 AM"));
        assert_eq!("12:15", sheet_time("12:15 pm"));
        assert_eq!("09:05", sheet_time("9:05"));
        assert_eq!("14:30", sheet_time("14:30:00"));
        assert_eq!("TBD", sheet_time("TBD"));
    }

    #[test]
    fn row_normalization() {
        let ids = SequentialIdGenerator::new("s");
        let row = RawRow::from_pairs(&[
            ("رقم مجموعة", "1024"),
            ("اسم المجموعة", "مجموعة النور"),
            ("العدد", "6"),
            ("الحركة", "وصول"),
            ("تاريخ", "2025-12-19"),
            ("وقت الرحلة", "2:30 pm"),
            ("رقم الرحلة", "SV1234"),
            ("من", "جدة"),
            ("إلى", "مكة المكرمة"),
        ]);
        let record = normalize_row(&row, &ids, DateFormat::Iso).unwrap();
        assert_eq!("s1", record.id());
        assert_eq!(&MovementKind::Arrival, record.kind());
        assert_eq!("14:30", record.time());
        assert_eq!(Some(VehicleClass::Van), record.vehicle_class());
        assert_eq!("وصول — جدة → مكة المكرمة", record.label());
        assert_eq!(TripStatus::Planned, record.status());
    }

    #[test]
    fn row_normalization_keeps_sheet_label_and_vehicle() {
        let ids = SequentialIdGenerator::new("s");
        let row = RawRow::from_pairs(&[
            ("Group Name", "Al Huda"),
            ("Car Type", "باص"),
            ("tafweej", "نقل خاص"),
            ("Movement", "مهمة جديدة"),
        ]);
        let record = normalize_row(&row, &ids, DateFormat::Iso).unwrap();
        assert_eq!("0", record.count());
        assert_eq!(Some(VehicleClass::Bus), record.vehicle_class());
        assert_eq!("نقل خاص", record.label());
        assert_eq!("مهمة جديدة", record.field(RecordField::Kind));
    }

    #[test]
    fn empty_rows_are_skipped() {
        let ids = SequentialIdGenerator::new("s");
        let row = RawRow::from_pairs(&[("العدد", "5"), ("الحركة", "وصول")]);
        assert_eq!(None, normalize_row(&row, &ids, DateFormat::Iso));
        assert_eq!(0, ids.get());
    }

    #[test]
    fn csv_import() {
        let ids = SequentialIdGenerator::new("c");
        let data = "\
رقم مجموعة,اسم المجموعة,العدد,الحركة,تاريخ,من,إلى
1024,مجموعة النور,3,وصول,19/12/2025,جدة,المدينة المنورة
,,,,,,
1024,مجموعة النور,3,مغادرة,28/12/2025,مكة المكرمة,جدة
";
        let records = import_csv(data.as_bytes(), &ids, DateFormat::Iso).unwrap();
        assert_eq!(2, records.len());
        assert_eq!("2025-12-19", records[0].date());
        assert_eq!(&MovementKind::Departure, records[1].kind());
        assert_eq!("c2", records[1].id());
    }

    #[test]
    fn csv_import_empty_sheet() {
        let ids = SequentialIdGenerator::new("c");
        let result = import_csv("رقم مجموعة,العدد\n".as_bytes(), &ids, DateFormat::Iso);
        assert!(matches!(result, Err(TafweejError::EmptySheet)));
    }

    #[test]
    fn csv_export() {
        let ids = SequentialIdGenerator::new("e");
        let mut record = MovementRecord::new(
            ids.next(),
            &GroupInfo::new("1024", "مجموعة النور", "12 pax"),
            Movement {
                kind: MovementKind::Departure,
                date: "2025-12-28".to_string(),
                time: "06:15".to_string(),
                flight: "XY 555".to_string(),
                from: "مكة المكرمة".to_string(),
                to: "جدة".to_string(),
            },
            Some(VehicleClass::Bus),
        );
        record.set_field(RecordField::Status, "Confirmed").unwrap();

        let mut output = Vec::new();
        export_csv(&mut output, &[record]).unwrap();
        let output = String::from_utf8(output).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            Some(
                "الحالة,الحركة,تفويج,نوع السيارة,إلى,من,وقت الرحلة,رقم الرحلة,العدد,اسم المجموعة,رقم مجموعة,تاريخ"
            ),
            lines.next()
        );
        assert_eq!(
            Some(
                "مؤكد,مغادرة,مغادرة — مكة المكرمة → جدة,باص,جدة,مكة المكرمة,06:15,XY 555,12,مجموعة النور,1024,2025-12-28"
            ),
            lines.next()
        );
        assert_eq!(None, lines.next());
    }

    #[test]
    fn backup_roundtrip_assigns_missing_ids() {
        let ids = SequentialIdGenerator::new("b");
        let json = r#"
            {
                "version": 1,
                "allRows": [
                    { "id": "keep", "groupNo": "1", "kind": "وصول", "status": "Delayed" },
                    { "groupNo": "2", "kind": "مغادرة" }
                ],
                "deletedRows": [
                    { "id": "", "groupNo": "3" }
                ]
            }"#;
        let backup = Backup::read(json.as_bytes(), &ids).unwrap();
        assert_eq!(1, backup.version());
        assert_eq!("keep", backup.all_rows()[0].id());
        assert_eq!(TripStatus::Delayed, backup.all_rows()[0].status());
        assert_eq!("b1", backup.all_rows()[1].id());
        assert_eq!("b2", backup.deleted_rows()[0].id());

        let mut output = Vec::new();
        backup.write(&mut output).unwrap();
        let reloaded = Backup::read(output.as_slice(), &ids).unwrap();
        assert_eq!(backup.all_rows(), reloaded.all_rows());
        assert_eq!(2, ids.get());
    }

    #[test]
    fn backup_reads_historical_row_keys() {
        let ids = SequentialIdGenerator::new("b");
        let json = r#"
            {
                "version": 1,
                "allRows": [
                    {
                        "id": "a1",
                        "groupNo": "7",
                        "count": "3",
                        "Column1": "وصول",
                        "carType": "سيدان",
                        "tafweej": "وصول — جدة → مكة المكرمة"
                    },
                    { "id": "a2", "groupNo": "8", "count": "?", "Column1": "مغادرة", "carType": "" },
                    { "id": "a3", "groupNo": "9", "vehicleClass": "" },
                    { "id": "a4", "groupNo": "10", "carType": "Bus" }
                ],
                "deletedRows": []
            }"#;
        let backup = Backup::read(json.as_bytes(), &ids).unwrap();
        let rows = backup.all_rows();
        assert_eq!(4, rows.len());
        assert_eq!(&MovementKind::Arrival, rows[0].kind());
        assert_eq!(Some(VehicleClass::Sedan), rows[0].vehicle_class());
        assert_eq!(&MovementKind::Departure, rows[1].kind());
        assert_eq!(None, rows[1].vehicle_class());
        assert_eq!(None, rows[2].vehicle_class());
        assert_eq!(Some(VehicleClass::Bus), rows[3].vehicle_class());
        assert_eq!(0, ids.get());
    }

    #[test]
    fn backup_rejects_unknown_version() {
        let ids = SequentialIdGenerator::new("b");
        let result = Backup::read(r#"{ "version": 2 }"#.as_bytes(), &ids);
        assert!(matches!(
            result,
            Err(TafweejError::UnsupportedBackupVersion(2))
        ));
    }
}
