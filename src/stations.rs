use crate::models::StationLookup;

/// (city, railway station code, airport IATA code)
const CITY_CODES: &[(&str, &str, &str)] = &[
    ("New Delhi", "NDLS", "DEL"),
    ("Mumbai", "CSTM", "BOM"),
    ("Bangalore", "SBC", "BLR"),
    ("Hyderabad", "HYB", "HYD"),
    ("Chennai", "MAS", "MAA"),
    ("Kolkata", "HWH", "CCU"),
    ("Pune", "PUNE", "PNQ"),
    ("Ahmedabad", "ADI", "AMD"),
    ("Jaipur", "JP", "JAI"),
    ("Bhopal", "BPL", "BPL"),
    ("Lucknow", "LKO", "LKO"),
    ("Goa", "MAO", "GOI"),
    ("Patna", "PNBE", "PAT"),
    ("Guwahati", "GHY", "GAU"),
    ("Nagpur", "NGP", "NAG"),
    ("Visakhapatnam", "VSKP", "VTZ"),
    ("Coimbatore", "CBE", "CJB"),
    ("Thiruvananthapuram", "TVC", "TRV"),
    ("Indore", "INDB", "IDR"),
    ("Varanasi", "BSB", "VNS"),
];

fn find(city: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
    let city = city.trim();
    CITY_CODES.iter().find(|(name, _, _)| name.eq_ignore_ascii_case(city))
}

pub fn station_code(city: &str) -> Option<&'static str> {
    find(city).map(|(_, station, _)| *station)
}

pub fn iata_code(city: &str) -> Option<&'static str> {
    find(city).map(|(_, _, iata)| *iata)
}

pub fn lookup(city: &str) -> StationLookup {
    StationLookup { city: city.to_string(), station_code: station_code(city), iata_code: iata_code(city) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_cities_resolve() {
        assert_eq!(station_code("New Delhi"), Some("NDLS"));
        assert_eq!(iata_code("New Delhi"), Some("DEL"));
        assert_eq!(station_code("Bhopal"), Some("BPL"));
        assert_eq!(iata_code("Goa"), Some("GOI"));
    }

    #[test]
    fn matching_ignores_case_and_padding() {
        assert_eq!(station_code("  new delhi "), Some("NDLS"));
    }

    #[test]
    fn unknown_city_has_no_codes() {
        let l = lookup("Atlantis");
        assert_eq!(l.station_code, None);
        assert_eq!(l.iata_code, None);
    }
}
