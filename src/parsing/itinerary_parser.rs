/// # Itinerary parsing
///
/// Turns a pasted trip itinerary into the ordered movement records of one group:
///
/// 1. the arrival movement, airport to the first destination,
/// 2. one inter-city movement for every change of destination, in visiting order,
/// 3. the departure movement, last destination to airport.
///
/// Text without any arrival or departure section but longer than 10 characters yields a
/// single unspecified movement (`? → ?`) so the group still shows up for manual completion.
/// Empty and very short texts yield nothing.
///
/// Parsing never fails: missing fields become empty strings, the `-` flight placeholder, or
/// the default cities (Jeddah for airports, Makkah for destinations).
use crate::{
    ids::{IdGenerator, TimestampIdGenerator},
    models::{GroupInfo, Movement, MovementKind, MovementRecord, ParserOptions, VehicleClass},
    parsing::{
        city_parser::{JEDDAH, MAKKAH, normalize_city},
        destination_parser::{self, DestinationBlock},
        helpers::passenger_count,
        segment_parser::{self, Segment, SegmentKind},
    },
};

/// Placeholder for an unknown endpoint.
pub const UNKNOWN_PLACE: &str = "?";

const FALLBACK_MIN_CHARS: usize = 10;

/// Vehicle class for a string-encoded passenger count, `None` when the count is not a number.
pub fn vehicle_class(count: &str) -> Option<VehicleClass> {
    passenger_count(count).map(VehicleClass::for_passengers)
}

fn arrival_movement(segment: &Segment, destinations: &[DestinationBlock]) -> Movement {
    let first = destinations.first();
    let date = segment
        .date()
        .map(String::from)
        .or_else(|| first.map(|block| block.start_date().to_string()))
        .unwrap_or_default();
    let from = segment
        .airport()
        .or(segment.coming_from())
        .map_or_else(|| JEDDAH.to_string(), normalize_city);
    let to = first.map_or(MAKKAH, |block| block.city()).to_string();

    Movement {
        kind: MovementKind::Arrival,
        date,
        time: segment.time().to_string(),
        flight: segment.flight().to_string(),
        from,
        to,
    }
}

fn departure_movement(segment: &Segment, destinations: &[DestinationBlock]) -> Movement {
    let from = destinations
        .last()
        .map_or(MAKKAH, |block| block.city())
        .to_string();
    let to = segment
        .airport()
        .map_or_else(|| JEDDAH.to_string(), normalize_city);

    Movement {
        kind: MovementKind::Departure,
        date: segment.date().unwrap_or_default().to_string(),
        time: segment.time().to_string(),
        flight: segment.flight().to_string(),
        from,
        to,
    }
}

/// One movement per adjacent pair of destinations whose cities differ, dated at the start
/// of the later destination.
fn inter_city_movements(destinations: &[DestinationBlock]) -> Vec<Movement> {
    destinations
        .windows(2)
        .filter(|pair| pair[0].city() != pair[1].city())
        .map(|pair| Movement {
            kind: MovementKind::InterCity,
            date: pair[1].start_date().to_string(),
            from: pair[0].city().to_string(),
            to: pair[1].city().to_string(),
            ..Default::default()
        })
        .collect()
}

fn fallback_movement() -> Movement {
    Movement {
        kind: MovementKind::Unspecified,
        from: UNKNOWN_PLACE.to_string(),
        to: UNKNOWN_PLACE.to_string(),
        ..Default::default()
    }
}

/// Extracts the movements of an itinerary in trip order.
pub fn movements(text: &str, options: ParserOptions) -> Vec<Movement> {
    let date_format = options.date_format();

    let arrival = segment_parser::find_block(text, SegmentKind::Arrival)
        .map(|block| segment_parser::parse(block, SegmentKind::Arrival, date_format));
    let departure = segment_parser::find_block(text, SegmentKind::Departure)
        .map(|block| segment_parser::parse(block, SegmentKind::Departure, date_format));

    if arrival.is_none() && departure.is_none() {
        if text.trim().chars().count() > FALLBACK_MIN_CHARS {
            log::info!("No arrival or departure section found, emitting an unspecified movement.");
            return vec![fallback_movement()];
        }
        return Vec::new();
    }

    let destinations = destination_parser::parse(text, date_format);

    let mut movements = Vec::new();
    if let Some(segment) = &arrival {
        movements.push(arrival_movement(segment, &destinations));
    }
    movements.extend(inter_city_movements(&destinations));
    if let Some(segment) = &departure {
        movements.push(departure_movement(segment, &destinations));
    }
    movements
}

/// Parses an itinerary with explicit options and id source.
pub fn parse_with(
    text: &str,
    group: &GroupInfo,
    options: ParserOptions,
    ids: &dyn IdGenerator,
) -> Vec<MovementRecord> {
    let vehicle_class = vehicle_class(group.count());
    let records = movements(text, options)
        .into_iter()
        .map(|movement| MovementRecord::new(ids.next(), group, movement, vehicle_class))
        .collect::<Vec<_>>();

    log::info!(
        "Parsed {} movement(s) for group {}.",
        records.len(),
        group.group_no()
    );
    records
}

/// Parses an itinerary with default options and timestamp based ids.
pub fn parse(text: &str, group: &GroupInfo) -> Vec<MovementRecord> {
    parse_with(
        text,
        group,
        ParserOptions::default(),
        &TimestampIdGenerator::new(),
    )
}
