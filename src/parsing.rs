mod city_parser;
mod destination_parser;
mod helpers;
mod itinerary_parser;
mod segment_parser;

pub use city_parser::{CAIRO, JEDDAH, MADINAH, MAKKAH, TAIF, normalize_city};
pub use destination_parser::{DestinationBlock, parse as parse_destinations};
pub use helpers::{normalize_date, normalize_time};
pub use itinerary_parser::{
    UNKNOWN_PLACE, movements, parse as parse_itinerary, parse_with as parse_itinerary_with,
    vehicle_class,
};
pub use segment_parser::{ARRIVAL_MARKER, DEPARTURE_MARKER, NO_FLIGHT};

pub(crate) use helpers::{DATE_TOKEN, fold_digits, parse_date, passenger_count};
