use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::{TResult, TafweejError};

// ------------------------------------------------------------------------------------------------
// --- DateFormat
// ------------------------------------------------------------------------------------------------

/// Canonical display format applied to every date the crate emits.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    #[default]
    Iso,
    /// `DD/MM/YYYY`
    DayFirst,
}

impl DateFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::Iso => "%Y-%m-%d",
            DateFormat::DayFirst => "%d/%m/%Y",
        }
    }
}

// ------------------------------------------------------------------------------------------------
// --- ParserOptions
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ParserOptions {
    date_format: DateFormat,
}

impl ParserOptions {
    pub fn new(date_format: DateFormat) -> Self {
        Self { date_format }
    }

    // Getters/Setters

    pub fn date_format(&self) -> DateFormat {
        self.date_format
    }
}

// ------------------------------------------------------------------------------------------------
// --- GroupInfo
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    group_no: String,
    group_name: String,
    count: String,
}

impl GroupInfo {
    pub fn new(group_no: &str, group_name: &str, count: &str) -> Self {
        Self {
            group_no: group_no.to_string(),
            group_name: group_name.to_string(),
            count: count.to_string(),
        }
    }

    // Getters/Setters

    pub fn group_no(&self) -> &str {
        &self.group_no
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn count(&self) -> &str {
        &self.count
    }
}

// ------------------------------------------------------------------------------------------------
// --- MovementKind
// ------------------------------------------------------------------------------------------------

/// The movement column is free text in practice (imported sheets carry labels such as
/// "مهمة جديدة"), so anything that is not one of the known kinds is kept verbatim in `Other`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum MovementKind {
    Arrival,
    InterCity,
    Departure,
    #[default]
    Unspecified,
    Other(String),
}

impl MovementKind {
    pub fn label(&self) -> &str {
        match self {
            MovementKind::Arrival => "وصول",
            MovementKind::InterCity => "بين المدن",
            MovementKind::Departure => "مغادرة",
            MovementKind::Unspecified => "غير محدد",
            MovementKind::Other(label) => label,
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for MovementKind {
    fn from(value: &str) -> Self {
        match value.trim() {
            "وصول" | "Arrival" => MovementKind::Arrival,
            "بين المدن" | "InterCity" | "Inter-city" => MovementKind::InterCity,
            "مغادرة" | "Departure" => MovementKind::Departure,
            "غير محدد" | "Unspecified" => MovementKind::Unspecified,
            other => MovementKind::Other(other.to_string()),
        }
    }
}

impl From<String> for MovementKind {
    fn from(value: String) -> Self {
        MovementKind::from(value.as_str())
    }
}

impl From<MovementKind> for String {
    fn from(value: MovementKind) -> Self {
        value.label().to_string()
    }
}

// ------------------------------------------------------------------------------------------------
// --- VehicleClass
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum VehicleClass {
    #[serde(rename = "سيدان")]
    #[strum(to_string = "سيدان", serialize = "Sedan")]
    Sedan,

    #[serde(rename = "جمس")]
    #[strum(to_string = "جمس", serialize = "GMC", serialize = "Van")]
    Van,

    #[serde(rename = "باص")]
    #[strum(to_string = "باص", serialize = "Bus")]
    Bus,
}

impl VehicleClass {
    /// 1-4 passengers ride a sedan, 5-6 a van, anything else a bus.
    pub fn for_passengers(passengers: i64) -> Self {
        match passengers {
            1..=4 => VehicleClass::Sedan,
            5..=6 => VehicleClass::Van,
            _ => VehicleClass::Bus,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// --- TripStatus
// ------------------------------------------------------------------------------------------------

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    Hash,
    PartialEq,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum TripStatus {
    #[default]
    #[strum(to_string = "Planned", serialize = "مخطط")]
    Planned,

    #[strum(to_string = "Confirmed", serialize = "مؤكد")]
    Confirmed,

    #[serde(rename = "Driver Assigned")]
    #[strum(to_string = "Driver Assigned", serialize = "تم تعيين السائق")]
    DriverAssigned,

    #[serde(rename = "In Progress")]
    #[strum(to_string = "In Progress", serialize = "قيد التنفيذ")]
    InProgress,

    #[strum(to_string = "Completed", serialize = "مكتمل")]
    Completed,

    #[strum(to_string = "Delayed", serialize = "متأخر")]
    Delayed,

    #[strum(to_string = "Cancelled", serialize = "ملغي")]
    Cancelled,
}

impl TripStatus {
    pub fn label_ar(&self) -> &'static str {
        match self {
            TripStatus::Planned => "مخطط",
            TripStatus::Confirmed => "مؤكد",
            TripStatus::DriverAssigned => "تم تعيين السائق",
            TripStatus::InProgress => "قيد التنفيذ",
            TripStatus::Completed => "مكتمل",
            TripStatus::Delayed => "متأخر",
            TripStatus::Cancelled => "ملغي",
        }
    }
}

// ------------------------------------------------------------------------------------------------
// --- RecordField
// ------------------------------------------------------------------------------------------------

/// Closed set of editable record fields. Parses from the camelCase field names used in
/// JSON documents as well as the historical column keys (`Column1`, `carType`, `tafweej`).
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum RecordField {
    GroupNo,
    GroupName,
    Count,
    Kind,
    Date,
    Time,
    Flight,
    From,
    To,
    VehicleClass,
    Label,
    Status,
}

impl FromStr for RecordField {
    type Err = TafweejError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim() {
            "groupNo" => RecordField::GroupNo,
            "groupName" => RecordField::GroupName,
            "count" => RecordField::Count,
            "kind" | "Column1" => RecordField::Kind,
            "date" => RecordField::Date,
            "time" => RecordField::Time,
            "flight" => RecordField::Flight,
            "from" => RecordField::From,
            "to" => RecordField::To,
            "vehicleClass" | "carType" => RecordField::VehicleClass,
            "label" | "tafweej" => RecordField::Label,
            "status" => RecordField::Status,
            other => return Err(TafweejError::UnknownField(other.to_string())),
        };
        Ok(field)
    }
}

// ------------------------------------------------------------------------------------------------
// --- Movement
// ------------------------------------------------------------------------------------------------

/// One extracted transport leg, before group data and identity are attached.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Movement {
    pub kind: MovementKind,
    pub date: String,
    pub time: String,
    pub flight: String,
    pub from: String,
    pub to: String,
}

// ------------------------------------------------------------------------------------------------
// --- MovementRecord
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovementRecord {
    id: String,
    group_no: String,
    group_name: String,
    count: String,
    #[serde(alias = "Column1")]
    kind: MovementKind,
    date: String,
    time: String,
    flight: String,
    from: String,
    to: String,
    #[serde(alias = "carType", deserialize_with = "lenient_vehicle_class")]
    vehicle_class: Option<VehicleClass>,
    #[serde(rename = "tafweej")]
    label: String,
    status: TripStatus,
}

/// Stored rows may carry an empty or free-text vehicle cell, which reads as no vehicle class.
fn lenient_vehicle_class<'de, D>(deserializer: D) -> Result<Option<VehicleClass>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|value| VehicleClass::from_str(value.trim()).ok()))
}

impl MovementRecord {
    pub fn new(
        id: String,
        group: &GroupInfo,
        movement: Movement,
        vehicle_class: Option<VehicleClass>,
    ) -> Self {
        let Movement {
            kind,
            date,
            time,
            flight,
            from,
            to,
        } = movement;
        let label = describe(&kind, &from, &to);

        Self {
            id,
            group_no: group.group_no.clone(),
            group_name: group.group_name.clone(),
            count: group.count.clone(),
            kind,
            date,
            time,
            flight,
            from,
            to,
            vehicle_class,
            label,
            status: TripStatus::Planned,
        }
    }

    // Getters/Setters

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: String) {
        self.id = id;
    }

    pub fn group_no(&self) -> &str {
        &self.group_no
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn count(&self) -> &str {
        &self.count
    }

    pub fn kind(&self) -> &MovementKind {
        &self.kind
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn flight(&self) -> &str {
        &self.flight
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn vehicle_class(&self) -> Option<VehicleClass> {
        self.vehicle_class
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: String) {
        self.label = label;
    }

    pub fn status(&self) -> TripStatus {
        self.status
    }

    // Functions

    /// Reads one field as display text.
    pub fn field(&self, field: RecordField) -> String {
        match field {
            RecordField::GroupNo => self.group_no.clone(),
            RecordField::GroupName => self.group_name.clone(),
            RecordField::Count => self.count.clone(),
            RecordField::Kind => self.kind.to_string(),
            RecordField::Date => self.date.clone(),
            RecordField::Time => self.time.clone(),
            RecordField::Flight => self.flight.clone(),
            RecordField::From => self.from.clone(),
            RecordField::To => self.to.clone(),
            RecordField::VehicleClass => self
                .vehicle_class
                .map(|v| v.to_string())
                .unwrap_or_default(),
            RecordField::Label => self.label.clone(),
            RecordField::Status => self.status.to_string(),
        }
    }

    /// Sets one field from display text. Changing the kind or an endpoint rebuilds the label.
    pub fn set_field(&mut self, field: RecordField, value: &str) -> TResult<()> {
        match field {
            RecordField::GroupNo => self.group_no = value.to_string(),
            RecordField::GroupName => self.group_name = value.to_string(),
            RecordField::Count => self.count = value.to_string(),
            RecordField::Kind => self.kind = MovementKind::from(value),
            RecordField::Date => self.date = value.to_string(),
            RecordField::Time => self.time = value.to_string(),
            RecordField::Flight => self.flight = value.to_string(),
            RecordField::From => self.from = value.to_string(),
            RecordField::To => self.to = value.to_string(),
            RecordField::VehicleClass => {
                self.vehicle_class = if value.trim().is_empty() {
                    None
                } else {
                    Some(
                        VehicleClass::from_str(value.trim())
                            .map_err(|_| TafweejError::UnknownVehicleClass(value.to_string()))?,
                    )
                };
            }
            RecordField::Label => self.label = value.to_string(),
            RecordField::Status => {
                self.status = TripStatus::from_str(value.trim())
                    .map_err(|_| TafweejError::UnknownStatus(value.to_string()))?;
            }
        }

        if matches!(field, RecordField::Kind | RecordField::From | RecordField::To) {
            self.label = describe(&self.kind, &self.from, &self.to);
        }
        Ok(())
    }

    /// Required fields left empty, in display order.
    pub fn missing_required(&self) -> Vec<RecordField> {
        [RecordField::Date, RecordField::From, RecordField::To]
            .into_iter()
            .filter(|&field| self.field(field).trim().is_empty())
            .collect()
    }
}

/// `"<kind> — <from> → <to>"`
pub fn describe(kind: &MovementKind, from: &str, to: &str) -> String {
    format!("{kind} — {from} → {to}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::tests::get_json_values;
    use pretty_assertions::assert_eq;
    use test_log::test;

    fn record() -> MovementRecord {
        MovementRecord::new(
            "r1".to_string(),
            &GroupInfo::new("G-12", "Al Noor", "3"),
            Movement {
                kind: MovementKind::Arrival,
                date: "2025-12-19".to_string(),
                time: "14:30".to_string(),
                flight: "SV1234".to_string(),
                from: "جدة".to_string(),
                to: "مكة المكرمة".to_string(),
            },
            Some(VehicleClass::Sedan),
        )
    }

    #[test]
    fn vehicle_class_boundaries() {
        assert_eq!(VehicleClass::Sedan, VehicleClass::for_passengers(1));
        assert_eq!(VehicleClass::Sedan, VehicleClass::for_passengers(4));
        assert_eq!(VehicleClass::Van, VehicleClass::for_passengers(5));
        assert_eq!(VehicleClass::Van, VehicleClass::for_passengers(6));
        assert_eq!(VehicleClass::Bus, VehicleClass::for_passengers(7));
        assert_eq!(VehicleClass::Bus, VehicleClass::for_passengers(0));
    }

    #[test]
    fn movement_kind_keeps_unknown_labels() {
        assert_eq!(MovementKind::Arrival, MovementKind::from("وصول"));
        assert_eq!(MovementKind::InterCity, MovementKind::from("InterCity"));
        let other = MovementKind::from("مهمة جديدة");
        assert_eq!(MovementKind::Other("مهمة جديدة".to_string()), other);
        assert_eq!("مهمة جديدة", other.to_string());
    }

    #[test]
    fn status_parses_english_and_arabic() {
        assert_eq!(
            TripStatus::DriverAssigned,
            TripStatus::from_str("Driver Assigned").unwrap()
        );
        assert_eq!(TripStatus::Delayed, TripStatus::from_str("متأخر").unwrap());
        assert_eq!("In Progress", TripStatus::InProgress.to_string());
        assert_eq!("ملغي", TripStatus::Cancelled.label_ar());
        assert!(TripStatus::from_str("Lost").is_err());
    }

    #[test]
    fn set_field_rebuilds_label() {
        let mut record = record();
        record.set_field(RecordField::From, "المدينة المنورة").unwrap();
        assert_eq!("وصول — المدينة المنورة → مكة المكرمة", record.label());

        record.set_field(RecordField::Kind, "مغادرة").unwrap();
        assert_eq!("مغادرة — المدينة المنورة → مكة المكرمة", record.label());

        record.set_field(RecordField::Flight, "XY 220").unwrap();
        assert_eq!("مغادرة — المدينة المنورة → مكة المكرمة", record.label());
        assert_eq!("XY 220", record.flight());
    }

    #[test]
    fn set_field_rejects_unknown_status() {
        let mut record = record();
        record.set_field(RecordField::Status, "قيد التنفيذ").unwrap();
        assert_eq!(TripStatus::InProgress, record.status());
        assert!(matches!(
            record.set_field(RecordField::Status, "Lost"),
            Err(TafweejError::UnknownStatus(_))
        ));
        assert_eq!(TripStatus::InProgress, record.status());
    }

    #[test]
    fn set_field_vehicle_class() {
        let mut record = record();
        record.set_field(RecordField::VehicleClass, "bus").unwrap();
        assert_eq!(Some(VehicleClass::Bus), record.vehicle_class());
        record.set_field(RecordField::VehicleClass, "").unwrap();
        assert_eq!(None, record.vehicle_class());
        assert!(record.set_field(RecordField::VehicleClass, "bicycle").is_err());
    }

    #[test]
    fn record_field_from_column_keys() {
        assert_eq!(RecordField::Kind, RecordField::from_str("Column1").unwrap());
        assert_eq!(RecordField::Label, RecordField::from_str("tafweej").unwrap());
        assert_eq!(
            RecordField::VehicleClass,
            RecordField::from_str("carType").unwrap()
        );
        assert!(matches!(
            RecordField::from_str("_originalIndex"),
            Err(TafweejError::UnknownField(_))
        ));
    }

    #[test]
    fn missing_required_fields() {
        let mut record = record();
        assert!(record.missing_required().is_empty());
        record.set_field(RecordField::Date, "").unwrap();
        record.set_field(RecordField::To, " ").unwrap();
        assert_eq!(
            vec![RecordField::Date, RecordField::To],
            record.missing_required()
        );
    }

    #[test]
    fn record_serialization() {
        let record = record();
        let reference = r#"
            {
                "id": "r1",
                "groupNo": "G-12",
                "groupName": "Al Noor",
                "count": "3",
                "kind": "وصول",
                "date": "2025-12-19",
                "time": "14:30",
                "flight": "SV1234",
                "from": "جدة",
                "to": "مكة المكرمة",
                "vehicleClass": "سيدان",
                "tafweej": "وصول — جدة → مكة المكرمة",
                "status": "Planned"
            }"#;
        let (record, reference) = get_json_values(&record, reference).unwrap();
        assert_eq!(record, reference);
    }
}
